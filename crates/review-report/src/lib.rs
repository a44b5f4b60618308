//! Report generation engine for the performance review portal.
//!
//! Pre-fetched questionnaire, response, and user rows go in; a paginated PDF
//! analytics report comes out. The pipeline is split into independent stages
//! (scoring, snapshot, charts, layout, serialization) so callers can stop after
//! any of them and discard the intermediate artifact.

pub mod charts;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod i18n;
pub mod report;
pub mod scoring;
pub mod telemetry;

pub use export::{generate_report, render_report, suggested_filename, RenderedReport, ReportOptions};
pub use report::{ReportInputs, ReportSnapshot, SnapshotBuilder};
