use crate::scoring::{AnswersByLinkId, QuestionItem, SectionDef};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Pre-fetched rows handed over by the data layer for one report request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportInputs {
    #[serde(default)]
    pub questionnaires: Vec<QuestionnaireRow>,
    #[serde(default)]
    pub responses: Vec<ResponseRow>,
    #[serde(default)]
    pub users: Vec<UserRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionnaireRow {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub items: Vec<QuestionItem>,
    #[serde(default)]
    pub sections: Vec<SectionDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Draft,
    #[default]
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePeriod {
    pub id: i64,
    pub label: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRow {
    pub id: i64,
    pub questionnaire_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub status: ResponseStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub period: Option<PerformancePeriod>,
    #[serde(default)]
    pub answers: AnswersByLinkId,
}

impl ResponseRow {
    pub fn is_submitted(&self) -> bool {
        self.status == ResponseStatus::Submitted
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub work_function: Option<String>,
}

/// Parses a raw questionnaire filter; malformed or non-positive ids yield `None`.
pub fn parse_questionnaire_filter(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_parsing_rejects_malformed_ids() {
        assert_eq!(parse_questionnaire_filter(" 12 "), Some(12));
        assert_eq!(parse_questionnaire_filter("0"), None);
        assert_eq!(parse_questionnaire_filter("-3"), None);
        assert_eq!(parse_questionnaire_filter("abc"), None);
        assert_eq!(parse_questionnaire_filter(""), None);
    }

    #[test]
    fn responses_default_to_submitted() {
        let row: ResponseRow = serde_json::from_str(
            r#"{"id": 1, "questionnaire_id": 2, "user_id": 3, "answers": {"q1": [{"valueInteger": 4}]}}"#,
        )
        .expect("response parses");
        assert!(row.is_submitted());
        assert_eq!(row.answers["q1"].len(), 1);
    }
}
