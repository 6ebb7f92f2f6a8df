//! Risk assessment pipeline: form intake, the two interchangeable scoring
//! strategies, result rendering, sessions, and report export.

pub mod batch;
pub mod controller;
pub mod domain;
pub mod heuristic;
pub mod intake;
pub mod remote;
pub mod renderer;
pub mod report;
pub mod router;
pub mod scorer;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use batch::{score_csv, score_csv_path, BatchError, BatchRow};
pub use controller::{AssessmentController, SubmissionReceipt};
pub use domain::{
    AssessmentError, ClinicalMeasurements, FormFields, LabLevel, LifestyleSurvey, RiskCategory,
    RiskResult, Severity, Sex, ValidatedInput,
};
pub use heuristic::{HeuristicAssessment, HeuristicScorer, RiskFactor, ScoreComponent};
pub use remote::{
    normalize_prediction, HttpPredictionGateway, PredictionGateway, PredictionRequest,
    RemotePredictorClient,
};
pub use renderer::{
    DisplaySnapshot, DisplayState, RenderOutcome, RenderedAssessment, ResultRenderer,
    SubmissionToken,
};
pub use report::{
    DisabledRecommendations, HttpRecommendationService, RecommendationError,
    RecommendationRequest, RecommendationService, RecommendationSource, ReportDocument,
    ReportExporter, FALLBACK_RECOMMENDATION,
};
pub use router::assessment_router;
pub use scorer::{scorer_from_config, RiskScorer};
pub use service::{AssessmentService, AssessmentServiceError};
pub use session::{SessionError, SessionId, SessionStore};
