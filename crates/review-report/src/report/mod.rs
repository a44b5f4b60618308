//! Report snapshot assembly from pre-fetched rows.

pub mod inputs;
mod snapshot;
pub mod views;

pub use inputs::{
    parse_questionnaire_filter, PerformancePeriod, QuestionnaireRow, ReportInputs, ResponseRow,
    ResponseStatus, UserRow,
};
pub use snapshot::{SnapshotBuilder, USER_BREAKDOWN_LIMIT};
pub use views::{
    truncate_label, ChartPoint, QuestionnaireSummary, ReportSnapshot, SectionBreakdown,
    SectionScore, SummaryCounts, UserBreakdownEntry, WorkFunctionSummary, CHART_LABEL_LIMIT,
};
