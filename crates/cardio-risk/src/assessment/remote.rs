use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::domain::{AssessmentError, ClinicalMeasurements, RiskResult, Sex};
use crate::config::PredictorConfig;

/// Wire body sent to the prediction endpoint. Categorical answers travel as
/// their numeric codes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub gender: u8,
    pub ap_hi: f64,
    pub ap_lo: f64,
    pub cholesterol: u8,
    pub gluc: u8,
    pub smoke: u8,
    pub alco: u8,
    pub active: u8,
}

impl From<&ClinicalMeasurements> for PredictionRequest {
    fn from(value: &ClinicalMeasurements) -> Self {
        Self {
            age: value.age_days,
            height: value.height_cm,
            weight: value.weight_kg,
            gender: match value.gender {
                Sex::Male => 1,
                Sex::Female => 2,
            },
            ap_hi: value.systolic_bp,
            ap_lo: value.diastolic_bp,
            cholesterol: value.cholesterol.code(),
            gluc: value.glucose.code(),
            smoke: u8::from(value.smoker),
            alco: u8::from(value.alcohol),
            active: u8::from(value.physically_active),
        }
    }
}

/// Transport to the external prediction service. Implementations return the
/// decoded JSON body; interpreting it is left to [`normalize_prediction`].
#[async_trait]
pub trait PredictionGateway: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<Value, AssessmentError>;
}

/// `reqwest`-backed gateway issuing one POST per call.
#[derive(Debug, Clone)]
pub struct HttpPredictionGateway {
    client: Client,
    endpoint: String,
}

impl HttpPredictionGateway {
    pub fn new(config: &PredictorConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl PredictionGateway for HttpPredictionGateway {
    async fn predict(&self, request: &PredictionRequest) -> Result<Value, AssessmentError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                AssessmentError::PredictionUnavailable(format!("prediction request failed: {err}"))
            })?;

        let status = response.status();
        let body: Option<Value> = response.json().await.ok();
        interpret_response(status, body)
    }
}

/// A failed status never yields a payload, even when the body looks like one.
fn interpret_response(status: StatusCode, body: Option<Value>) -> Result<Value, AssessmentError> {
    if !status.is_success() {
        let detail = body
            .as_ref()
            .and_then(|body| body.get("error"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|detail| !detail.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("prediction endpoint returned {status}"));
        return Err(AssessmentError::PredictionUnavailable(detail));
    }

    body.ok_or_else(|| {
        AssessmentError::PredictionUnavailable(
            "prediction endpoint returned a non-JSON body".to_string(),
        )
    })
}

/// Turns a prediction payload into a [`RiskResult`], refusing anything that
/// carries an `error` field or lacks a bounded probability.
pub fn normalize_prediction(body: &Value) -> Result<RiskResult, AssessmentError> {
    if let Some(error) = body.get("error").filter(|value| !value.is_null()) {
        let detail = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(AssessmentError::PredictionUnavailable(detail));
    }

    let probability = body
        .get("probability")
        .and_then(Value::as_f64)
        .filter(|value| value.is_finite() && (0.0..=1.0).contains(value))
        .ok_or_else(|| {
            AssessmentError::PredictionUnavailable(
                "response is missing a probability between 0 and 1".to_string(),
            )
        })?;

    let label = body
        .get("prediction")
        .and_then(prediction_label)
        .ok_or_else(|| {
            AssessmentError::PredictionUnavailable(
                "response is missing a prediction label".to_string(),
            )
        })?;

    let score = probability * 100.0;
    Ok(RiskResult::new(
        score,
        format!("{label}. Probability of heart disease: {score:.2}%"),
    ))
}

fn prediction_label(value: &Value) -> Option<String> {
    match value {
        Value::String(label) if !label.trim().is_empty() => Some(label.trim().to_string()),
        Value::Number(number) => match number.as_f64() {
            Some(flag) if flag == 1.0 => Some("Has Cardiovascular Disease".to_string()),
            Some(flag) if flag == 0.0 => Some("No Cardiovascular Disease".to_string()),
            _ => None,
        },
        Value::Bool(true) => Some("Has Cardiovascular Disease".to_string()),
        Value::Bool(false) => Some("No Cardiovascular Disease".to_string()),
        _ => None,
    }
}

/// Scores clinical measurements by delegating to a prediction service.
pub struct RemotePredictorClient {
    gateway: Box<dyn PredictionGateway>,
}

impl RemotePredictorClient {
    pub fn new(gateway: Box<dyn PredictionGateway>) -> Self {
        Self { gateway }
    }

    pub fn from_config(config: &PredictorConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(Box::new(HttpPredictionGateway::new(config)?)))
    }

    /// Issues exactly one request; failures are not retried.
    pub async fn predict(
        &self,
        measurements: &ClinicalMeasurements,
    ) -> Result<RiskResult, AssessmentError> {
        let request = PredictionRequest::from(measurements);
        let body = self.gateway.predict(&request).await.inspect_err(|err| {
            warn!(error = %err, "prediction transport failed");
        })?;

        let result = normalize_prediction(&body).inspect_err(|err| {
            warn!(error = %err, "prediction response rejected");
        })?;
        debug!(score = result.score(), category = ?result.category(), "prediction normalized");
        Ok(result)
    }
}

impl std::fmt::Debug for RemotePredictorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemotePredictorClient").finish_non_exhaustive()
    }
}
