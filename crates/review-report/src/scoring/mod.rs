//! Questionnaire weighting and score aggregation.

mod aggregate;
pub mod domain;
mod weights;

pub use aggregate::{
    achieved_fraction, aggregate_series, compute_section_breakdown, percentage_of, score_response,
    ResponseAnswers, ScoredResponse, LIKERT_SCALE_MAX, SERIES_LIMIT,
};
pub use domain::{
    AnswerSet, AnswerValue, AnswersByLinkId, Attachment, Coding, ItemType, Quantity, QuestionItem,
    SectionDef,
};
pub use weights::{
    even_likert_weights, resolve_effective_weight, resolve_weights, WeightCache, WeightMap,
    DEFAULT_TOTAL_WEIGHT, NOMINAL_WEIGHT,
};

pub(crate) use aggregate::MeanAccumulator;
