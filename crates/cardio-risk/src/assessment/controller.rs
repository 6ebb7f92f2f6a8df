use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::domain::{AssessmentError, FormFields};
use super::renderer::{
    DisplaySnapshot, DisplayState, RenderOutcome, RenderedAssessment, ResultRenderer,
};
use super::scorer::RiskScorer;
use crate::config::ScoringStrategy;

/// Result of one accepted submission as seen after the renderer decided
/// whether to apply it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub generation: u64,
    #[serde(flatten)]
    pub outcome: RenderOutcome,
    pub display: DisplayState,
    pub export_enabled: bool,
}

impl SubmissionReceipt {
    pub fn was_applied(&self) -> bool {
        self.outcome == RenderOutcome::Applied
    }
}

/// View-model for one assessment session: owns the renderer and drives a
/// scorer through validate, begin, score, render.
pub struct AssessmentController {
    scorer: Arc<dyn RiskScorer>,
    renderer: ResultRenderer,
}

impl AssessmentController {
    pub fn new(scorer: Arc<dyn RiskScorer>) -> Self {
        Self {
            scorer,
            renderer: ResultRenderer::new(),
        }
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.scorer.strategy()
    }

    /// Scores one submission. `InvalidInput` is returned before the display
    /// changes; scoring failures are rendered and reported in the receipt.
    pub async fn submit(&self, fields: &FormFields) -> Result<SubmissionReceipt, AssessmentError> {
        let input = self.scorer.validate(fields).inspect_err(|err| {
            info!(error = %err, "submission rejected before scoring");
        })?;

        let token = self.renderer.begin(input.clone());
        info!(
            generation = token.generation(),
            strategy = self.scorer.strategy().label(),
            "scoring submission"
        );

        let outcome = self.scorer.score(&input).await;
        if let Err(err) = &outcome {
            warn!(generation = token.generation(), error = %err, "scoring failed");
        }

        let (render, snapshot) = self.renderer.complete(token, outcome);

        Ok(SubmissionReceipt {
            generation: token.generation(),
            outcome: render,
            display: snapshot.display,
            export_enabled: snapshot.export_enabled,
        })
    }

    pub fn display(&self) -> DisplaySnapshot {
        self.renderer.snapshot()
    }

    pub fn exportable(&self) -> Option<RenderedAssessment> {
        self.renderer.exportable()
    }
}

impl std::fmt::Debug for AssessmentController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssessmentController")
            .field("strategy", &self.scorer.strategy())
            .field("renderer", &self.renderer)
            .finish()
    }
}
