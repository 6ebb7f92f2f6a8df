use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::assessment::controller::AssessmentController;
use crate::assessment::domain::{
    AssessmentError, FormFields, LifestyleSurvey, RiskResult, Sex, ValidatedInput,
};
use crate::assessment::heuristic::HeuristicScorer;
use crate::assessment::intake;
use crate::assessment::remote::{PredictionGateway, PredictionRequest, RemotePredictorClient};
use crate::assessment::report::{
    RecommendationError, RecommendationRequest, RecommendationService, ReportExporter,
};
use crate::assessment::scorer::RiskScorer;
use crate::assessment::service::AssessmentService;
use crate::assessment::session::{SessionError, SessionId, SessionStore};
use crate::config::ScoringStrategy;

pub(super) fn lifestyle_fields() -> FormFields {
    FormFields::new()
        .with("age", "55")
        .with("sex", "male")
        .with("bmi", "32")
        .with("smoking", "1")
        .with("diabetic", "0")
        .with("stroke", "0")
        .with("physical", "1")
        .with("genhealth", "4")
        .with("sleep", "7")
        .with("alcohol", "0")
}

pub(super) fn young_lifestyle_fields() -> FormFields {
    FormFields::new()
        .with("age", "25")
        .with("sex", "female")
        .with("bmi", "22")
        .with("smoking", "0")
        .with("diabetic", "0")
        .with("stroke", "1")
        .with("physical", "0")
        .with("genhealth", "1")
        .with("sleep", "4")
        .with("alcohol", "1")
}

pub(super) fn clinical_fields() -> FormFields {
    FormFields::new()
        .with("age", "20228")
        .with("height", "156")
        .with("weight", "85")
        .with("gender", "1")
        .with("ap_hi", "140")
        .with("ap_lo", "90")
        .with("cholesterol", "3")
        .with("gluc", "1")
        .with("smoke", "0")
        .with("alco", "0")
        .with("active", "1")
}

/// Lowest-risk survey: every rule contributes zero points.
pub(super) fn baseline_survey() -> LifestyleSurvey {
    LifestyleSurvey {
        age_years: 20.0,
        sex: Sex::Female,
        bmi: 21.0,
        smoking: false,
        diabetic: false,
        alcohol: Some(false),
        prior_stroke: Some(false),
        physical_activity: Some(true),
        sleep_hours: Some(8.0),
        general_health: Some(5),
    }
}

pub(super) fn lifestyle_input() -> ValidatedInput {
    ValidatedInput::Lifestyle(intake::lifestyle_survey(&lifestyle_fields()).expect("valid"))
}

pub(super) fn heuristic_scorer() -> Arc<dyn RiskScorer> {
    Arc::new(HeuristicScorer::new())
}

/// Prediction gateway answering every request with the same body.
pub(super) struct CannedGateway(Result<Value, AssessmentError>);

#[async_trait]
impl PredictionGateway for CannedGateway {
    async fn predict(&self, _request: &PredictionRequest) -> Result<Value, AssessmentError> {
        self.0.clone()
    }
}

pub(super) fn remote_scorer(body: Result<Value, AssessmentError>) -> Arc<dyn RiskScorer> {
    Arc::new(RemotePredictorClient::new(Box::new(CannedGateway(body))))
}

/// Scorer whose completions are released by the test, one gate per call in
/// call order.
#[derive(Default)]
pub(super) struct GatedScorer {
    gates: Mutex<VecDeque<oneshot::Receiver<Result<RiskResult, AssessmentError>>>>,
}

impl GatedScorer {
    pub(super) fn gate(&self) -> oneshot::Sender<Result<RiskResult, AssessmentError>> {
        let (sender, receiver) = oneshot::channel();
        self.gates
            .lock()
            .expect("gate mutex poisoned")
            .push_back(receiver);
        sender
    }
}

#[async_trait]
impl RiskScorer for GatedScorer {
    fn strategy(&self) -> ScoringStrategy {
        ScoringStrategy::Remote
    }

    fn validate(&self, fields: &FormFields) -> Result<ValidatedInput, AssessmentError> {
        intake::lifestyle_survey(fields).map(ValidatedInput::Lifestyle)
    }

    async fn score(&self, _input: &ValidatedInput) -> Result<RiskResult, AssessmentError> {
        let gate = self
            .gates
            .lock()
            .expect("gate mutex poisoned")
            .pop_front();
        match gate {
            Some(receiver) => receiver.await.unwrap_or_else(|_| {
                Err(AssessmentError::PredictionUnavailable(
                    "gate dropped".to_string(),
                ))
            }),
            None => Err(AssessmentError::PredictionUnavailable(
                "no gate queued".to_string(),
            )),
        }
    }
}

/// Waits until the controller has started the given generation.
pub(super) async fn wait_for_generation(controller: &AssessmentController, generation: u64) {
    while controller.display().display.generation() != Some(generation) {
        tokio::task::yield_now().await;
    }
}

pub(super) struct StaticRecommendations(pub(super) &'static str);

#[async_trait]
impl RecommendationService for StaticRecommendations {
    async fn recommend(
        &self,
        _request: &RecommendationRequest,
    ) -> Result<String, RecommendationError> {
        Ok(self.0.to_string())
    }
}

pub(super) struct FailingRecommendations;

#[async_trait]
impl RecommendationService for FailingRecommendations {
    async fn recommend(
        &self,
        _request: &RecommendationRequest,
    ) -> Result<String, RecommendationError> {
        Err(RecommendationError::Transport("connection refused".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemorySessions {
    sessions: Mutex<HashMap<SessionId, Arc<AssessmentController>>>,
}

impl SessionStore for MemorySessions {
    fn insert(
        &self,
        id: SessionId,
        controller: Arc<AssessmentController>,
    ) -> Result<(), SessionError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        if guard.contains_key(&id) {
            return Err(SessionError::Conflict);
        }
        guard.insert(id, controller);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<Arc<AssessmentController>>, SessionError> {
        Ok(self
            .sessions
            .lock()
            .expect("session mutex poisoned")
            .get(id)
            .cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<bool, SessionError> {
        Ok(self
            .sessions
            .lock()
            .expect("session mutex poisoned")
            .remove(id)
            .is_some())
    }
}

pub(super) struct OfflineSessions;

impl SessionStore for OfflineSessions {
    fn insert(
        &self,
        _id: SessionId,
        _controller: Arc<AssessmentController>,
    ) -> Result<(), SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<Arc<AssessmentController>>, SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<bool, SessionError> {
        Err(SessionError::Unavailable("store offline".to_string()))
    }
}

pub(super) fn build_service(
    scorer: Arc<dyn RiskScorer>,
    recommendations: Box<dyn RecommendationService>,
) -> Arc<AssessmentService<MemorySessions>> {
    Arc::new(AssessmentService::new(
        Arc::new(MemorySessions::default()),
        scorer,
        Arc::new(ReportExporter::new(recommendations)),
    ))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 16 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
