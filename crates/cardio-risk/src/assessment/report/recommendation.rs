use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::assessment::domain::{RiskCategory, RiskResult};
use crate::config::RecommendationConfig;

/// Upper bound on embedded recommendation text.
pub const RECOMMENDATION_WORD_LIMIT: usize = 600;

pub const FALLBACK_RECOMMENDATION: &str =
    "Error retrieving recommendations. Please consult a healthcare professional.";

/// Inputs passed to the text-generation service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationRequest {
    pub prediction: bool,
    pub probability: f64,
}

impl RecommendationRequest {
    pub fn from_result(result: &RiskResult) -> Self {
        Self {
            prediction: result.category() == RiskCategory::High,
            probability: result.probability(),
        }
    }

    pub const fn prediction_label(&self) -> &'static str {
        if self.prediction {
            "Has Cardiovascular Disease"
        } else {
            "No Cardiovascular Disease"
        }
    }

    pub fn prompt(&self) -> String {
        format!(
            "A patient has undergone a cardiovascular disease prediction test.\n\
             Prediction: {}\n\
             Probability of disease: {:.2}\n\
             Provide structured lifestyle recommendations including diet, exercise, and medical advice \
             appropriate to this probability. Limit the answer to {} words, avoid bold text and \
             heading styles, and reply in plain text.",
            self.prediction_label(),
            self.probability,
            RECOMMENDATION_WORD_LIMIT
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("no recommendation service is configured")]
    NotConfigured,
    #[error("recommendation request failed: {0}")]
    Transport(String),
    #[error("recommendation service returned no text")]
    EmptyResponse,
}

/// External text-generation boundary. The returned text is embedded as-is.
#[async_trait]
pub trait RecommendationService: Send + Sync {
    async fn recommend(&self, request: &RecommendationRequest)
        -> Result<String, RecommendationError>;
}

/// Used when no endpoint is configured; every report gets the fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRecommendations;

#[async_trait]
impl RecommendationService for DisabledRecommendations {
    async fn recommend(
        &self,
        _request: &RecommendationRequest,
    ) -> Result<String, RecommendationError> {
        Err(RecommendationError::NotConfigured)
    }
}

/// Calls a generateContent-style endpoint with a single text prompt.
#[derive(Debug, Clone)]
pub struct HttpRecommendationService {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpRecommendationService {
    pub fn new(
        config: &RecommendationConfig,
        endpoint: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl RecommendationService for HttpRecommendationService {
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<String, RecommendationError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": request.prompt() }] }]
        });

        let mut call = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            call = call.header("x-goog-api-key", key);
        }

        let response = call
            .send()
            .await
            .map_err(|err| RecommendationError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            return Err(RecommendationError::Transport(format!(
                "endpoint returned {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| RecommendationError::Transport(err.to_string()))?;

        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(RecommendationError::EmptyResponse)
    }
}

/// Keeps at most `limit` whitespace-separated words, preserving line breaks
/// inside the kept span.
pub fn bound_words(text: &str, limit: usize) -> String {
    let trimmed = text.trim();
    let mut seen = 0;
    let mut in_word = false;

    for (index, ch) in trimmed.char_indices() {
        if ch.is_whitespace() {
            in_word = false;
            continue;
        }
        if !in_word {
            if seen == limit {
                return trimmed[..index].trim_end().to_string();
            }
            seen += 1;
            in_word = true;
        }
    }

    trimmed.to_string()
}
