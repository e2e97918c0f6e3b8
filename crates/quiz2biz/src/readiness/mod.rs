//! Session-level readiness orchestration on top of the pure scoring engine.
//!
//! The service loads catalog, question, and response state through [`ReadinessRepository`],
//! scores it with [`crate::scoring::ScoringEngine`], and persists the raw score back onto the
//! session. The router exposes the same operations over HTTP.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CoverageOverride, DimensionCatalogEntry, QuestionRecord, QuestionnaireId, ResponseRecord,
    ScoreTrend, SessionId, SessionRecord, UserId,
};
pub use repository::{ReadinessRepository, RepositoryError};
pub use router::{readiness_router, NextQuestionsQuery, SimulationRequest, USER_ID_HEADER};
pub use service::{
    HeatmapFormat, HeatmapReport, NextQuestionsResponse, ReadinessProgress, ReadinessResponse,
    ReadinessService, ReadinessServiceError, ThresholdCheck,
};
