use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info};

use super::domain::{AssessmentError, RiskCategory, RiskResult, Severity, ValidatedInput};

/// What a client should show for the current submission cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DisplayState {
    Idle,
    Pending {
        generation: u64,
    },
    Ready {
        generation: u64,
        score: f64,
        category: RiskCategory,
        message: String,
        severity: Severity,
    },
    Failed {
        generation: u64,
        error: &'static str,
        detail: String,
    },
}

impl DisplayState {
    pub fn generation(&self) -> Option<u64> {
        match self {
            Self::Idle => None,
            Self::Pending { generation }
            | Self::Ready { generation, .. }
            | Self::Failed { generation, .. } => Some(*generation),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Proof that a submission began; only the holder of the current token may
/// write a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionToken {
    generation: u64,
}

impl SubmissionToken {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenderOutcome {
    Applied,
    Discarded { current_generation: u64 },
}

/// Latest successful submission, kept for report export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedAssessment {
    pub generation: u64,
    pub input: ValidatedInput,
    pub result: RiskResult,
}

/// Display state together with whether report export is currently allowed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub display: DisplayState,
    pub export_enabled: bool,
}

#[derive(Debug)]
struct RendererState {
    generation: u64,
    display: DisplayState,
    pending_input: Option<ValidatedInput>,
    latest: Option<RenderedAssessment>,
    export_enabled: bool,
}

/// Sole writer of [`DisplayState`]. Each update replaces the state wholesale.
#[derive(Debug)]
pub struct ResultRenderer {
    state: Mutex<RendererState>,
}

impl Default for ResultRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultRenderer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RendererState {
                generation: 0,
                display: DisplayState::Idle,
                pending_input: None,
                latest: None,
                export_enabled: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RendererState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new cycle: shows the loading marker and disables export.
    /// Any token handed out earlier becomes stale.
    pub fn begin(&self, input: ValidatedInput) -> SubmissionToken {
        let mut state = self.lock();
        state.generation += 1;
        let generation = state.generation;
        state.display = DisplayState::Pending { generation };
        state.pending_input = Some(input);
        state.export_enabled = false;
        debug!(generation, "submission pending");
        SubmissionToken { generation }
    }

    /// Applies a completed scoring attempt unless a newer submission has
    /// started since `token` was issued.
    pub fn render(
        &self,
        token: SubmissionToken,
        outcome: Result<RiskResult, AssessmentError>,
    ) -> RenderOutcome {
        self.complete(token, outcome).0
    }

    /// Like [`ResultRenderer::render`], also returning the display as it stood
    /// when the decision was made.
    pub fn complete(
        &self,
        token: SubmissionToken,
        outcome: Result<RiskResult, AssessmentError>,
    ) -> (RenderOutcome, DisplaySnapshot) {
        let mut state = self.lock();
        let render = Self::apply(&mut state, token, outcome);
        let snapshot = DisplaySnapshot {
            display: state.display.clone(),
            export_enabled: state.export_enabled,
        };
        (render, snapshot)
    }

    fn apply(
        state: &mut RendererState,
        token: SubmissionToken,
        outcome: Result<RiskResult, AssessmentError>,
    ) -> RenderOutcome {
        if token.generation != state.generation {
            info!(
                stale = token.generation,
                current = state.generation,
                "discarding stale scoring result"
            );
            return RenderOutcome::Discarded {
                current_generation: state.generation,
            };
        }

        let generation = token.generation;
        match outcome {
            Ok(result) => {
                state.display = DisplayState::Ready {
                    generation,
                    score: result.score(),
                    category: result.category(),
                    message: result.message().to_string(),
                    severity: result.severity(),
                };
                let input = state.pending_input.take();
                state.export_enabled = input.is_some();
                state.latest = input.map(|input| RenderedAssessment {
                    generation,
                    input,
                    result,
                });
            }
            Err(err) => {
                state.display = DisplayState::Failed {
                    generation,
                    error: err.kind(),
                    detail: err.to_string(),
                };
                state.pending_input = None;
                state.export_enabled = false;
            }
        }

        RenderOutcome::Applied
    }

    pub fn display(&self) -> DisplayState {
        self.lock().display.clone()
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        let state = self.lock();
        DisplaySnapshot {
            display: state.display.clone(),
            export_enabled: state.export_enabled,
        }
    }

    pub fn export_enabled(&self) -> bool {
        self.lock().export_enabled
    }

    /// The rendered submission a report may be built from, if export is on.
    pub fn exportable(&self) -> Option<RenderedAssessment> {
        let state = self.lock();
        if state.export_enabled {
            state.latest.clone()
        } else {
            None
        }
    }
}
