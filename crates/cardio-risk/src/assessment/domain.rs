use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Scores strictly above this are `High`.
pub const HIGH_RISK_THRESHOLD: f64 = 70.0;
/// Scores strictly above this (and not high) are `Moderate`.
pub const MODERATE_RISK_THRESHOLD: f64 = 40.0;

/// Raw, string-typed form submission keyed by field name.
///
/// JSON numbers and booleans are accepted and kept as their textual form;
/// `null` is treated as an absent field. Nothing is coerced here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Value>")]
pub struct FormFields(BTreeMap<String, String>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Trimmed value of a field, `None` when absent or blank.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormFields
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

impl TryFrom<BTreeMap<String, Value>> for FormFields {
    type Error = String;

    fn try_from(raw: BTreeMap<String, Value>) -> Result<Self, Self::Error> {
        let mut fields = BTreeMap::new();
        for (name, value) in raw {
            let text = match value {
                Value::Null => continue,
                Value::String(text) => text,
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(format!("field `{name}` must be a string, number, or boolean"))
                }
            };
            fields.insert(name, text);
        }
        Ok(Self(fields))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Lifestyle-survey submission after coercion. Optional answers that were
/// left blank contribute nothing to the heuristic score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifestyleSurvey {
    pub age_years: f64,
    pub sex: Sex,
    pub bmi: f64,
    pub smoking: bool,
    pub diabetic: bool,
    pub alcohol: Option<bool>,
    pub prior_stroke: Option<bool>,
    pub physical_activity: Option<bool>,
    pub sleep_hours: Option<f64>,
    pub general_health: Option<u8>,
}

/// Three-step laboratory scale used for cholesterol and glucose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabLevel {
    Normal,
    AboveNormal,
    WellAboveNormal,
}

impl LabLevel {
    pub const fn code(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::AboveNormal => 2,
            Self::WellAboveNormal => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::AboveNormal => "Above normal",
            Self::WellAboveNormal => "Well above normal",
        }
    }
}

/// Clinical-measurement submission after coercion. Every field is required.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalMeasurements {
    pub age_days: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gender: Sex,
    pub systolic_bp: f64,
    pub diastolic_bp: f64,
    pub cholesterol: LabLevel,
    pub glucose: LabLevel,
    pub smoker: bool,
    pub alcohol: bool,
    pub physically_active: bool,
}

/// A submission that passed intake for one of the two schemas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum ValidatedInput {
    Lifestyle(LifestyleSurvey),
    Clinical(ClinicalMeasurements),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
}

impl RiskCategory {
    pub fn from_score(score: f64) -> Self {
        if score > HIGH_RISK_THRESHOLD {
            Self::High
        } else if score > MODERATE_RISK_THRESHOLD {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }

    pub const fn advisory(self) -> &'static str {
        match self {
            Self::High => {
                "High risk of heart disease. Please consult a healthcare professional as soon as possible."
            }
            Self::Moderate => {
                "Moderate risk of heart disease. Consider lifestyle changes and consult a healthcare professional."
            }
            Self::Low => {
                "Low risk of heart disease. Keep maintaining your current healthy habits."
            }
        }
    }

    pub const fn severity(self) -> Severity {
        match self {
            Self::High => Severity::Danger,
            Self::Moderate => Severity::Warning,
            Self::Low => Severity::Normal,
        }
    }
}

/// Visual emphasis tier paired with a rendered category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Warning,
    Danger,
}

/// Unified output of every scoring strategy. The category is always derived
/// from the score, so the fields are read-only once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskResult {
    score: f64,
    category: RiskCategory,
    message: String,
}

impl RiskResult {
    pub fn new(score: f64, message: impl Into<String>) -> Self {
        Self {
            score,
            category: RiskCategory::from_score(score),
            message: message.into(),
        }
    }

    /// Result carrying the fixed advisory for its category.
    pub fn with_advisory(score: f64) -> Self {
        let category = RiskCategory::from_score(score);
        Self {
            score,
            category,
            message: category.advisory().to_string(),
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn category(&self) -> RiskCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.category.severity()
    }

    /// Score expressed on the 0–1 probability scale.
    pub fn probability(&self) -> f64 {
        self.score / 100.0
    }
}

/// Failure of a single submission cycle. None of these are fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("prediction unavailable: {0}")]
    PredictionUnavailable(String),
}

impl AssessmentError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::PredictionUnavailable(_) => "prediction_unavailable",
        }
    }
}
