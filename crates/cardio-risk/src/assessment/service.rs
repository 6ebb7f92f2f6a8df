use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;

use super::controller::{AssessmentController, SubmissionReceipt};
use super::domain::{AssessmentError, FormFields};
use super::renderer::DisplaySnapshot;
use super::report::{ReportDocument, ReportExporter};
use super::scorer::RiskScorer;
use super::session::{SessionError, SessionId, SessionStore};
use crate::config::ScoringStrategy;

/// Service composing the configured scorer, session storage, and exporter.
pub struct AssessmentService<S> {
    store: Arc<S>,
    scorer: Arc<dyn RiskScorer>,
    exporter: Arc<ReportExporter>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

impl<S> AssessmentService<S>
where
    S: SessionStore + 'static,
{
    pub fn new(store: Arc<S>, scorer: Arc<dyn RiskScorer>, exporter: Arc<ReportExporter>) -> Self {
        Self {
            store,
            scorer,
            exporter,
        }
    }

    pub fn strategy(&self) -> ScoringStrategy {
        self.scorer.strategy()
    }

    /// Opens a session with a fresh, idle display.
    pub fn open_session(&self) -> Result<SessionId, AssessmentServiceError> {
        let id = next_session_id();
        let controller = Arc::new(AssessmentController::new(self.scorer.clone()));
        self.store.insert(id.clone(), controller)?;
        info!(session = %id, strategy = self.strategy().label(), "assessment session opened");
        Ok(id)
    }

    pub async fn submit(
        &self,
        id: &SessionId,
        fields: &FormFields,
    ) -> Result<SubmissionReceipt, AssessmentServiceError> {
        let controller = self.controller(id)?;
        let receipt = controller.submit(fields).await?;
        Ok(receipt)
    }

    pub fn display(&self, id: &SessionId) -> Result<DisplaySnapshot, AssessmentServiceError> {
        Ok(self.controller(id)?.display())
    }

    /// Builds the report for the latest rendered result of a session.
    pub async fn export(&self, id: &SessionId) -> Result<ReportDocument, AssessmentServiceError> {
        let rendered = self
            .controller(id)?
            .exportable()
            .ok_or(AssessmentServiceError::ExportDisabled)?;
        Ok(self.exporter.export(&rendered).await)
    }

    /// Closes a session. Its display and any unexported result are dropped.
    pub fn close_session(&self, id: &SessionId) -> Result<(), AssessmentServiceError> {
        if !self.store.remove(id)? {
            return Err(SessionError::NotFound.into());
        }
        info!(session = %id, "assessment session closed");
        Ok(())
    }

    fn controller(&self, id: &SessionId) -> Result<Arc<AssessmentController>, SessionError> {
        self.store.fetch(id)?.ok_or(SessionError::NotFound)
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error("report export is unavailable until a result has been rendered")]
    ExportDisabled,
}
