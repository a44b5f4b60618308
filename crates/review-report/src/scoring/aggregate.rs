use super::domain::{non_blank, AnswerValue, AnswersByLinkId, ItemType, QuestionItem, SectionDef};
use super::weights::{resolve_effective_weight, WeightMap};
use crate::report::views::{ChartPoint, SectionBreakdown, SectionScore};
use serde::Serialize;
use std::collections::HashMap;

pub const LIKERT_SCALE_MAX: f64 = 5.0;
pub const SERIES_LIMIT: usize = 12;

/// Score of one questionnaire response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResponse {
    pub response_id: i64,
    pub questionnaire_id: i64,
    pub achieved_points: f64,
    pub max_points: f64,
    pub percentage: u8,
}

impl AsRef<ScoredResponse> for ScoredResponse {
    fn as_ref(&self) -> &ScoredResponse {
        self
    }
}

/// Fraction (0..=1) of an item's weight earned by its answers.
pub fn achieved_fraction(item_type: ItemType, answers: &[AnswerValue]) -> f64 {
    match item_type {
        ItemType::Boolean => answers
            .iter()
            .find_map(boolean_like)
            .map(|truthy| if truthy { 1.0 } else { 0.0 })
            .unwrap_or(0.0),
        ItemType::Likert => answers
            .iter()
            .find_map(numeric_like)
            .map(|value| value.clamp(0.0, LIKERT_SCALE_MAX) / LIKERT_SCALE_MAX)
            .unwrap_or(0.0),
        ItemType::Choice => {
            if answers.iter().any(has_choice_content) {
                1.0
            } else {
                0.0
            }
        }
        _ => {
            if answers.iter().any(has_free_content) {
                1.0
            } else {
                0.0
            }
        }
    }
}

fn boolean_like(answer: &AnswerValue) -> Option<bool> {
    match answer {
        AnswerValue::Boolean(value) => Some(*value),
        AnswerValue::Integer(value) => Some(*value != 0),
        AnswerValue::Decimal(value) => Some(*value != 0.0),
        AnswerValue::Text(text) => parse_truthy(text),
        AnswerValue::Coding(coding) => coding
            .code
            .as_deref()
            .and_then(parse_truthy)
            .or_else(|| coding.display.as_deref().and_then(parse_truthy)),
        _ => None,
    }
}

fn parse_truthy(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn numeric_like(answer: &AnswerValue) -> Option<f64> {
    match answer {
        AnswerValue::Integer(value) => Some(*value as f64),
        AnswerValue::Decimal(value) if value.is_finite() => Some(*value),
        AnswerValue::Text(text) => leading_scale_digit(text),
        AnswerValue::Coding(coding) => coding.code.as_deref().and_then(leading_scale_digit),
        _ => None,
    }
}

fn leading_scale_digit(text: &str) -> Option<f64> {
    match text.trim_start().chars().next() {
        Some(digit @ '1'..='5') => digit.to_digit(10).map(f64::from),
        _ => None,
    }
}

fn has_choice_content(answer: &AnswerValue) -> bool {
    match answer {
        AnswerValue::Text(text) => non_blank(Some(text)),
        AnswerValue::Coding(coding) => coding.has_content(),
        _ => false,
    }
}

fn has_free_content(answer: &AnswerValue) -> bool {
    match answer {
        AnswerValue::Text(text) => non_blank(Some(text)),
        AnswerValue::Integer(_) => true,
        AnswerValue::Decimal(value) => value.is_finite(),
        _ => false,
    }
}

/// Points earned by one item, clamped to `[0, weight]`.
fn item_points(item: &QuestionItem, weight: f64, answers: &AnswersByLinkId) -> f64 {
    let entries = answers
        .get(&item.link_id)
        .map(Vec::as_slice)
        .unwrap_or_default();
    (weight * achieved_fraction(item.item_type, entries)).clamp(0.0, weight)
}

/// Rounded, clamped percentage; zero when nothing was scorable.
pub fn percentage_of(achieved: f64, max: f64) -> u8 {
    if max <= 0.0 || !max.is_finite() {
        return 0;
    }

    (100.0 * achieved / max).round().clamp(0.0, 100.0) as u8
}

pub fn score_response(
    response_id: i64,
    questionnaire_id: i64,
    items: &[QuestionItem],
    likert_weights: &WeightMap,
    answers: &AnswersByLinkId,
) -> ScoredResponse {
    let mut achieved_points = 0.0;
    let mut max_points = 0.0;

    for item in items.iter().filter(|item| item.is_scorable()) {
        let weight = resolve_effective_weight(item, likert_weights, true);
        if weight <= 0.0 {
            continue;
        }

        max_points += weight;
        achieved_points += item_points(item, weight, answers);
    }

    ScoredResponse {
        response_id,
        questionnaire_id,
        achieved_points,
        max_points,
        percentage: percentage_of(achieved_points, max_points),
    }
}

/// Answers of one response together with its breakdown heading.
#[derive(Debug, Clone, Copy)]
pub struct ResponseAnswers<'a> {
    pub title: &'a str,
    pub period: Option<&'a str>,
    pub answers: &'a AnswersByLinkId,
}

#[derive(Default)]
struct SectionTotals {
    weight: f64,
    achieved: f64,
}

/// Section subtotals for every response.
///
/// Items without a known section land in a trailing `general_label` bucket.
/// Sections with no weight are omitted, as are responses that end up with
/// no sections at all. Returns nothing when the questionnaire declares no
/// sections.
pub fn compute_section_breakdown(
    items: &[QuestionItem],
    sections: &[SectionDef],
    likert_weights: &WeightMap,
    responses: &[ResponseAnswers<'_>],
    general_label: &str,
) -> Vec<SectionBreakdown> {
    if sections.is_empty() {
        return Vec::new();
    }

    let position: HashMap<i64, usize> = sections
        .iter()
        .enumerate()
        .map(|(index, section)| (section.id, index))
        .collect();
    let general_index = sections.len();

    let weighted: Vec<(&QuestionItem, usize, f64)> = items
        .iter()
        .filter(|item| item.is_scorable())
        .map(|item| {
            let bucket = item
                .section_id
                .and_then(|id| position.get(&id).copied())
                .unwrap_or(general_index);
            (item, bucket, resolve_effective_weight(item, likert_weights, true))
        })
        .filter(|(_, _, weight)| *weight > 0.0)
        .collect();

    responses
        .iter()
        .filter_map(|response| {
            let mut totals: Vec<SectionTotals> =
                (0..=general_index).map(|_| SectionTotals::default()).collect();

            for (item, bucket, weight) in &weighted {
                let entry = &mut totals[*bucket];
                entry.weight += weight;
                entry.achieved += item_points(item, *weight, response.answers);
            }

            let scores: Vec<SectionScore> = totals
                .iter()
                .enumerate()
                .filter(|(_, totals)| totals.weight > 0.0)
                .map(|(index, totals)| SectionScore {
                    label: sections
                        .get(index)
                        .map(|section| section.title.clone())
                        .unwrap_or_else(|| general_label.to_string()),
                    score: round_to(totals.achieved / totals.weight * 100.0, 1),
                })
                .collect();

            if scores.is_empty() {
                return None;
            }

            Some(SectionBreakdown {
                title: response.title.to_string(),
                period: response.period.map(str::to_string),
                sections: scores,
            })
        })
        .collect()
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Default)]
pub(crate) struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub(crate) fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(round_to(self.sum / self.count as f64, 1))
        }
    }
}

/// Groups scored rows by `key_fn` into mean-percentage chart points.
///
/// Rows whose key is `None` are skipped. Points are ordered by descending
/// mean with the label as tiebreak and cut to the top [`SERIES_LIMIT`].
pub fn aggregate_series<T, F>(rows: &[T], key_fn: F) -> Vec<ChartPoint>
where
    T: AsRef<ScoredResponse>,
    F: Fn(&T) -> Option<String>,
{
    let mut groups: HashMap<String, MeanAccumulator> = HashMap::new();
    for row in rows {
        if let Some(key) = key_fn(row) {
            groups
                .entry(key)
                .or_default()
                .push(f64::from(row.as_ref().percentage));
        }
    }

    let mut points: Vec<(String, f64, usize)> = groups
        .into_iter()
        .filter_map(|(label, acc)| acc.mean().map(|mean| (label, mean, acc.count())))
        .collect();

    points.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    points.truncate(SERIES_LIMIT);

    points
        .into_iter()
        .map(|(label, mean, count)| ChartPoint::new(&label, mean, count))
        .collect()
}
