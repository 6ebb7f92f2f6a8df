use super::super::domain::LifestyleSurvey;
use super::{RiskFactor, ScoreComponent};

pub(crate) fn score_survey(survey: &LifestyleSurvey) -> (Vec<ScoreComponent>, u16) {
    let mut components = Vec::new();
    let mut total: u16 = 0;

    let mut award = |factor: RiskFactor, points: u8, note: String| {
        total += u16::from(points);
        components.push(ScoreComponent {
            factor,
            points,
            note,
        });
    };

    let age = survey.age_years;
    if age > 50.0 {
        award(RiskFactor::Age, 15, format!("age {age} is over 50"));
    } else if age > 40.0 {
        award(RiskFactor::Age, 10, format!("age {age} is between 41 and 50"));
    } else if age > 30.0 {
        award(RiskFactor::Age, 5, format!("age {age} is between 31 and 40"));
    }

    let bmi = survey.bmi;
    if bmi > 30.0 {
        award(RiskFactor::BodyMassIndex, 15, format!("BMI {bmi:.1} is obese"));
    } else if bmi > 25.0 {
        award(
            RiskFactor::BodyMassIndex,
            10,
            format!("BMI {bmi:.1} is overweight"),
        );
    }

    if survey.smoking {
        award(RiskFactor::Smoking, 20, "current smoker".to_string());
    }

    if survey.diabetic {
        award(RiskFactor::Diabetes, 15, "diabetic".to_string());
    }

    if survey.prior_stroke == Some(true) {
        award(RiskFactor::PriorStroke, 20, "history of stroke".to_string());
    }

    if survey.physical_activity == Some(false) {
        award(
            RiskFactor::PhysicalInactivity,
            10,
            "no regular physical activity".to_string(),
        );
    }

    if let Some(tier) = survey.general_health.filter(|tier| *tier < 3) {
        award(
            RiskFactor::GeneralHealth,
            15,
            format!("self-rated general health {tier}/5"),
        );
    }

    if let Some(hours) = survey.sleep_hours.filter(|hours| *hours < 6.0) {
        award(
            RiskFactor::ShortSleep,
            5,
            format!("{hours} hours of sleep"),
        );
    }

    if survey.alcohol == Some(true) {
        award(RiskFactor::Alcohol, 5, "regular alcohol use".to_string());
    }

    (components, total)
}
