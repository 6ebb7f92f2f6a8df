mod rules;

use serde::Serialize;

use super::domain::{LifestyleSurvey, RiskResult};

/// Heuristic scores never exceed this value.
pub const MAX_SCORE: u16 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Age,
    BodyMassIndex,
    Smoking,
    Diabetes,
    PriorStroke,
    PhysicalInactivity,
    GeneralHealth,
    ShortSleep,
    Alcohol,
}

/// Points awarded by one rule, kept for audit output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub factor: RiskFactor,
    pub points: u8,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeuristicAssessment {
    pub result: RiskResult,
    pub components: Vec<ScoreComponent>,
    /// Sum of all awarded points before clamping.
    pub raw_points: u16,
}

/// Stateless additive point scorer for lifestyle surveys.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, survey: &LifestyleSurvey) -> HeuristicAssessment {
        let (components, raw_points) = rules::score_survey(survey);
        let score = raw_points.min(MAX_SCORE);

        HeuristicAssessment {
            result: RiskResult::with_advisory(f64::from(score)),
            components,
            raw_points,
        }
    }
}
