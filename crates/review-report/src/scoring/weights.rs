use super::domain::{ItemType, QuestionItem};
use std::collections::HashMap;

/// Weight in percentage points keyed by [`QuestionItem::weight_key`].
pub type WeightMap = HashMap<String, f64>;

pub const DEFAULT_TOTAL_WEIGHT: f64 = 100.0;

/// Weight given to scorable items that carry no usable explicit weight.
pub const NOMINAL_WEIGHT: f64 = 1.0;

/// Splits `total_weight` evenly across every Likert item.
///
/// Returns an empty map when the questionnaire has no Likert items. The split
/// is a straight division; no remainder is redistributed.
pub fn even_likert_weights(items: &[QuestionItem], total_weight: f64) -> WeightMap {
    let likert: Vec<&QuestionItem> = items
        .iter()
        .filter(|item| item.item_type == ItemType::Likert)
        .collect();

    if likert.is_empty() {
        return WeightMap::new();
    }

    let total_weight = if total_weight.is_finite() {
        total_weight.max(0.0)
    } else {
        DEFAULT_TOTAL_WEIGHT
    };
    let share = total_weight / likert.len() as f64;

    likert
        .into_iter()
        .map(|item| (item.weight_key(), share))
        .collect()
}

/// Decides the scoring weight of a single item.
///
/// Non-Likert items are suppressed (weight 0) whenever Likert auto-weighting
/// is active for the questionnaire, even when they carry an explicit weight.
pub fn resolve_effective_weight(
    item: &QuestionItem,
    likert_weights: &WeightMap,
    is_scorable: bool,
) -> f64 {
    if !is_scorable {
        return 0.0;
    }

    if item.item_type == ItemType::Likert {
        if let Some(weight) = likert_weights.get(&item.weight_key()) {
            return *weight;
        }
    }

    if !likert_weights.is_empty() && item.item_type != ItemType::Likert {
        return 0.0;
    }

    match item.explicit_weight {
        Some(weight) if weight.is_finite() && weight > 0.0 => weight,
        _ => NOMINAL_WEIGHT,
    }
}

/// Effective weight of every item, in questionnaire order.
pub fn resolve_weights(items: &[QuestionItem], likert_weights: &WeightMap) -> Vec<f64> {
    items
        .iter()
        .map(|item| resolve_effective_weight(item, likert_weights, item.is_scorable()))
        .collect()
}

/// Request-scoped memo of Likert weight maps keyed by questionnaire id.
///
/// Create one per report request and drop it with the request.
#[derive(Debug, Default)]
pub struct WeightCache {
    entries: HashMap<i64, WeightMap>,
}

impl WeightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn likert_weights(&mut self, questionnaire_id: i64, items: &[QuestionItem]) -> &WeightMap {
        self.entries
            .entry(questionnaire_id)
            .or_insert_with(|| even_likert_weights(items, DEFAULT_TOTAL_WEIGHT))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
