mod recommendation;

pub use recommendation::{
    bound_words, DisabledRecommendations, HttpRecommendationService, RecommendationError,
    RecommendationRequest, RecommendationService, FALLBACK_RECOMMENDATION,
    RECOMMENDATION_WORD_LIMIT,
};

use std::fmt::Write as _;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::warn;

use super::domain::{ClinicalMeasurements, LifestyleSurvey, RiskResult, ValidatedInput};
use super::renderer::RenderedAssessment;
use crate::config::RecommendationConfig;

pub const REPORT_FILE_NAME: &str = "heart_risk_report.txt";
pub const REPORT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const REPORT_TITLE: &str = "Heart Disease Risk Assessment Report";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Service,
    Fallback,
}

/// Downloadable report. The body is opaque to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub recommendation_source: RecommendationSource,
    pub body: String,
}

/// Builds reports from rendered results, enriching them with generated
/// guidance when the recommendation service answers.
pub struct ReportExporter {
    recommendations: Box<dyn RecommendationService>,
}

impl ReportExporter {
    pub fn new(recommendations: Box<dyn RecommendationService>) -> Self {
        Self { recommendations }
    }

    pub fn from_config(config: &RecommendationConfig) -> Result<Self, reqwest::Error> {
        let service: Box<dyn RecommendationService> = match &config.endpoint {
            Some(endpoint) => Box::new(HttpRecommendationService::new(config, endpoint.clone())?),
            None => Box::new(DisabledRecommendations),
        };
        Ok(Self::new(service))
    }

    pub async fn export(&self, rendered: &RenderedAssessment) -> ReportDocument {
        self.export_at(rendered, Local::now().naive_local()).await
    }

    /// Never fails: a recommendation error degrades to the fallback text.
    pub async fn export_at(
        &self,
        rendered: &RenderedAssessment,
        generated_at: NaiveDateTime,
    ) -> ReportDocument {
        let request = RecommendationRequest::from_result(&rendered.result);
        let (recommendations, source) = match self.recommendations.recommend(&request).await {
            Ok(text) => (
                bound_words(&text, RECOMMENDATION_WORD_LIMIT),
                RecommendationSource::Service,
            ),
            Err(err) => {
                warn!(error = %err, "recommendations unavailable, using fallback");
                (
                    FALLBACK_RECOMMENDATION.to_string(),
                    RecommendationSource::Fallback,
                )
            }
        };

        ReportDocument {
            file_name: REPORT_FILE_NAME,
            content_type: REPORT_CONTENT_TYPE,
            recommendation_source: source,
            body: render_body(rendered, &recommendations, generated_at),
        }
    }
}

impl std::fmt::Debug for ReportExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportExporter").finish_non_exhaustive()
    }
}

fn render_body(
    rendered: &RenderedAssessment,
    recommendations: &str,
    generated_at: NaiveDateTime,
) -> String {
    let mut lines = match &rendered.input {
        ValidatedInput::Lifestyle(survey) => lifestyle_lines(survey),
        ValidatedInput::Clinical(measurements) => clinical_lines(measurements),
    };
    lines.extend(result_lines(&rendered.result));

    let mut body = String::new();
    writeln!(body, "{REPORT_TITLE}").expect("write report line");
    writeln!(body, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M"))
        .expect("write report line");
    body.push('\n');
    for line in lines {
        writeln!(body, "{line}").expect("write report line");
    }
    body.push('\n');
    writeln!(body, "Lifestyle Recommendations:").expect("write report line");
    writeln!(body, "{recommendations}").expect("write report line");
    body
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn optional_yes_no(flag: Option<bool>) -> &'static str {
    flag.map(yes_no).unwrap_or("Not provided")
}

fn lifestyle_lines(survey: &LifestyleSurvey) -> Vec<String> {
    vec![
        format!("Age: {} years", survey.age_years),
        format!("Sex: {}", survey.sex.label()),
        format!("BMI: {:.1}", survey.bmi),
        format!("Smoking: {}", yes_no(survey.smoking)),
        format!("Diabetic: {}", yes_no(survey.diabetic)),
        format!("Prior Stroke: {}", optional_yes_no(survey.prior_stroke)),
        format!(
            "Physical Activity: {}",
            optional_yes_no(survey.physical_activity)
        ),
        format!("Alcohol Consumption: {}", optional_yes_no(survey.alcohol)),
        match survey.sleep_hours {
            Some(hours) => format!("Sleep: {hours} hours"),
            None => "Sleep: Not provided".to_string(),
        },
        match survey.general_health {
            Some(tier) => format!("General Health: {tier}/5"),
            None => "General Health: Not provided".to_string(),
        },
    ]
}

fn clinical_lines(measurements: &ClinicalMeasurements) -> Vec<String> {
    vec![
        format!("Age: {} days", measurements.age_days),
        format!("Height: {} cm", measurements.height_cm),
        format!("Weight: {} kg", measurements.weight_kg),
        format!("Gender: {}", measurements.gender.label()),
        format!("Systolic BP: {}", measurements.systolic_bp),
        format!("Diastolic BP: {}", measurements.diastolic_bp),
        format!("Cholesterol Level: {}", measurements.cholesterol.label()),
        format!("Glucose Level: {}", measurements.glucose.label()),
        format!("Smoking: {}", yes_no(measurements.smoker)),
        format!("Alcohol Consumption: {}", yes_no(measurements.alcohol)),
        format!(
            "Physical Activity: {}",
            yes_no(measurements.physically_active)
        ),
    ]
}

fn result_lines(result: &RiskResult) -> Vec<String> {
    vec![
        format!("Risk Percentage: {:.2}%", result.score()),
        format!("Risk Level: {}", result.category().label()),
        format!("Message: {}", result.message()),
    ]
}
