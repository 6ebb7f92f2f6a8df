use std::sync::Arc;

use async_trait::async_trait;

use super::domain::{AssessmentError, FormFields, RiskResult, ValidatedInput};
use super::heuristic::HeuristicScorer;
use super::intake;
use super::remote::RemotePredictorClient;
use crate::config::{AppConfig, ScoringStrategy};

/// One scoring strategy. Validation is synchronous and runs before any
/// state change; scoring may suspend.
#[async_trait]
pub trait RiskScorer: Send + Sync {
    fn strategy(&self) -> ScoringStrategy;

    fn validate(&self, fields: &FormFields) -> Result<ValidatedInput, AssessmentError>;

    async fn score(&self, input: &ValidatedInput) -> Result<RiskResult, AssessmentError>;
}

#[async_trait]
impl RiskScorer for HeuristicScorer {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::Heuristic
    }

    fn validate(&self, fields: &FormFields) -> Result<ValidatedInput, AssessmentError> {
        intake::lifestyle_survey(fields).map(ValidatedInput::Lifestyle)
    }

    async fn score(&self, input: &ValidatedInput) -> Result<RiskResult, AssessmentError> {
        match input {
            ValidatedInput::Lifestyle(survey) => Ok(self.evaluate(survey).result),
            ValidatedInput::Clinical(_) => Err(AssessmentError::invalid(
                "form",
                "the heuristic scorer expects lifestyle survey fields",
            )),
        }
    }
}

#[async_trait]
impl RiskScorer for RemotePredictorClient {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::Remote
    }

    fn validate(&self, fields: &FormFields) -> Result<ValidatedInput, AssessmentError> {
        intake::clinical_measurements(fields).map(ValidatedInput::Clinical)
    }

    async fn score(&self, input: &ValidatedInput) -> Result<RiskResult, AssessmentError> {
        match input {
            ValidatedInput::Clinical(measurements) => self.predict(measurements).await,
            ValidatedInput::Lifestyle(_) => Err(AssessmentError::invalid(
                "form",
                "the remote predictor expects clinical measurement fields",
            )),
        }
    }
}

/// Builds the scorer selected by `APP_SCORING_STRATEGY`.
pub fn scorer_from_config(config: &AppConfig) -> Result<Arc<dyn RiskScorer>, reqwest::Error> {
    let scorer: Arc<dyn RiskScorer> = match config.scoring {
        ScoringStrategy::Heuristic => Arc::new(HeuristicScorer::new()),
        ScoringStrategy::Remote => Arc::new(RemotePredictorClient::from_config(&config.predictor)?),
    };
    Ok(scorer)
}
