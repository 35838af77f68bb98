//! Research domain logic for MineScout.
//!
//! This crate turns a free-text project label into a company/project identity,
//! builds the eight per-step search queries, runs them through the search
//! orchestrator into a session-scoped [`PipelineState`], and flattens the
//! session into a CSV report.

pub mod hints;
pub mod naming;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod steps;

pub use hints::{InfoHint, hints_for};
pub use naming::{ProjectLabel, parse_label};
pub use pipeline::{PipelineState, ResearchPipeline, SilentProgress, StepProgress, StepRecord};
pub use query::{build_query, queries_for};
pub use report::{ResearchReport, build_report, parse_csv, results_summary, write_report};
pub use steps::StepId;
