use chrono::{DateTime, Utc};
use serde::Serialize;

pub const CHART_LABEL_LIMIT: usize = 22;
pub const ELLIPSIS: char = '\u{2026}';

/// Shortens `text` to at most `limit` characters, ending in an ellipsis
/// when anything was cut. Counts characters, never splitting a code point.
pub fn truncate_label(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    if limit == 0 {
        return String::new();
    }

    let mut truncated: String = text.chars().take(limit - 1).collect();
    truncated.push(ELLIPSIS);
    truncated
}

/// One category of a bar or line chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    pub count: usize,
}

impl ChartPoint {
    pub fn new(label: &str, value: f64, count: usize) -> Self {
        Self {
            label: truncate_label(label, CHART_LABEL_LIMIT),
            value,
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionScore {
    pub label: String,
    pub score: f64,
}

/// Per-section subtotal of one scored response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionBreakdown {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    pub sections: Vec<SectionScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryCounts {
    pub questionnaires: usize,
    pub total_responses: usize,
    pub submitted_responses: usize,
    pub draft_responses: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionnaireSummary {
    pub id: i64,
    pub title: String,
    pub responses: usize,
    pub participants: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkFunctionSummary {
    pub name: String,
    pub participants: usize,
    pub responses: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserBreakdownEntry {
    pub user_id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_function: Option<String>,
    pub responses: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
}

/// Fully aggregated, request-scoped report model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSnapshot {
    pub summary: SummaryCounts,
    pub total_participants: usize,
    pub questionnaires: Vec<QuestionnaireSummary>,
    pub work_functions: Vec<WorkFunctionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_questionnaire_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_questionnaire_title: Option<String>,
    pub section_breakdowns: Vec<SectionBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_breakdown: Option<Vec<UserBreakdownEntry>>,
    pub questionnaire_chart: Vec<ChartPoint>,
    pub work_function_chart: Vec<ChartPoint>,
    pub period_chart: Vec<ChartPoint>,
    pub period_chart_selected: Vec<ChartPoint>,
    pub generated_at: DateTime<Utc>,
}

impl ReportSnapshot {
    pub fn empty(generated_at: DateTime<Utc>) -> Self {
        Self {
            summary: SummaryCounts::default(),
            total_participants: 0,
            questionnaires: Vec::new(),
            work_functions: Vec::new(),
            selected_questionnaire_id: None,
            selected_questionnaire_title: None,
            section_breakdowns: Vec::new(),
            user_breakdown: None,
            questionnaire_chart: Vec::new(),
            work_function_chart: Vec::new(),
            period_chart: Vec::new(),
            period_chart_selected: Vec::new(),
            generated_at,
        }
    }

    pub fn has_chart_data(&self) -> bool {
        !self.questionnaire_chart.is_empty()
            || !self.work_function_chart.is_empty()
            || !self.period_chart.is_empty()
    }
}
