//! Quiz2Biz readiness scoring: weighted residual-risk scores, gap heatmaps, and next-best
//! question ranking for business-readiness questionnaires.

pub mod catalog;
pub mod config;
pub mod error;
pub mod readiness;
pub mod scoring;
pub mod telemetry;

pub use error::AppError;
