//! Coercion of raw form fields into typed schemas. Required fields that are
//! missing or blank, and values that do not parse or fall outside their
//! range, are rejected; nothing is defaulted.

use super::domain::{
    AssessmentError, ClinicalMeasurements, FormFields, LabLevel, LifestyleSurvey, Sex,
};

const MAX_AGE_YEARS: f64 = 130.0;
const MAX_GENERAL_HEALTH_TIER: u8 = 5;

pub fn lifestyle_survey(fields: &FormFields) -> Result<LifestyleSurvey, AssessmentError> {
    let age_years = positive_number("age", required(fields, "age")?)?;
    if age_years > MAX_AGE_YEARS {
        return Err(AssessmentError::invalid(
            "age",
            format!("must not exceed {MAX_AGE_YEARS} years"),
        ));
    }

    let sex = lifestyle_sex(required(fields, "sex")?)?;
    let bmi = positive_number("bmi", required(fields, "bmi")?)?;
    let smoking = flag("smoking", required(fields, "smoking")?)?;
    let diabetic = flag("diabetic", required(fields, "diabetic")?)?;

    let alcohol = optional(fields, "alcohol", flag)?;
    let prior_stroke = optional(fields, "stroke", flag)?;
    let physical_activity = optional(fields, "physical", flag)?;
    let sleep_hours = optional(fields, "sleep", sleep_hours)?;
    let general_health = optional(fields, "genhealth", general_health_tier)?;

    Ok(LifestyleSurvey {
        age_years,
        sex,
        bmi,
        smoking,
        diabetic,
        alcohol,
        prior_stroke,
        physical_activity,
        sleep_hours,
        general_health,
    })
}

pub fn clinical_measurements(
    fields: &FormFields,
) -> Result<ClinicalMeasurements, AssessmentError> {
    let age_days = required(fields, "age")?
        .parse::<u32>()
        .ok()
        .filter(|days| *days > 0)
        .ok_or_else(|| AssessmentError::invalid("age", "must be a whole number of days"))?;

    Ok(ClinicalMeasurements {
        age_days,
        height_cm: positive_number("height", required(fields, "height")?)?,
        weight_kg: positive_number("weight", required(fields, "weight")?)?,
        gender: clinical_gender(required(fields, "gender")?)?,
        systolic_bp: positive_number("ap_hi", required(fields, "ap_hi")?)?,
        diastolic_bp: positive_number("ap_lo", required(fields, "ap_lo")?)?,
        cholesterol: lab_level("cholesterol", required(fields, "cholesterol")?)?,
        glucose: lab_level("gluc", required(fields, "gluc")?)?,
        smoker: flag("smoke", required(fields, "smoke")?)?,
        alcohol: flag("alco", required(fields, "alco")?)?,
        physically_active: flag("active", required(fields, "active")?)?,
    })
}

fn required<'a>(fields: &'a FormFields, name: &'static str) -> Result<&'a str, AssessmentError> {
    fields
        .get(name)
        .ok_or_else(|| AssessmentError::invalid(name, "required field is missing or empty"))
}

fn optional<T>(
    fields: &FormFields,
    name: &'static str,
    parse: fn(&'static str, &str) -> Result<T, AssessmentError>,
) -> Result<Option<T>, AssessmentError> {
    fields.get(name).map(|raw| parse(name, raw)).transpose()
}

fn number(name: &'static str, raw: &str) -> Result<f64, AssessmentError> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| AssessmentError::invalid(name, format!("'{raw}' is not a number")))
}

fn positive_number(name: &'static str, raw: &str) -> Result<f64, AssessmentError> {
    let value = number(name, raw)?;
    if value <= 0.0 {
        return Err(AssessmentError::invalid(name, "must be greater than zero"));
    }
    Ok(value)
}

fn sleep_hours(name: &'static str, raw: &str) -> Result<f64, AssessmentError> {
    let hours = number(name, raw)?;
    if !(0.0..=24.0).contains(&hours) {
        return Err(AssessmentError::invalid(name, "must be between 0 and 24 hours"));
    }
    Ok(hours)
}

fn general_health_tier(name: &'static str, raw: &str) -> Result<u8, AssessmentError> {
    raw.parse::<u8>()
        .ok()
        .filter(|tier| (1..=MAX_GENERAL_HEALTH_TIER).contains(tier))
        .ok_or_else(|| {
            AssessmentError::invalid(
                name,
                format!("must be a whole number from 1 to {MAX_GENERAL_HEALTH_TIER}"),
            )
        })
}

fn flag(name: &'static str, raw: &str) -> Result<bool, AssessmentError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        _ => Err(AssessmentError::invalid(
            name,
            format!("'{raw}' is not a yes/no answer"),
        )),
    }
}

fn lifestyle_sex(raw: &str) -> Result<Sex, AssessmentError> {
    match raw.to_ascii_lowercase().as_str() {
        "male" | "m" | "1" => Ok(Sex::Male),
        "female" | "f" | "2" => Ok(Sex::Female),
        _ => Err(AssessmentError::invalid(
            "sex",
            format!("'{raw}' is not male or female"),
        )),
    }
}

fn clinical_gender(raw: &str) -> Result<Sex, AssessmentError> {
    match raw {
        "1" => Ok(Sex::Male),
        "2" => Ok(Sex::Female),
        _ => Err(AssessmentError::invalid(
            "gender",
            "must be 1 (male) or 2 (female)",
        )),
    }
}

fn lab_level(name: &'static str, raw: &str) -> Result<LabLevel, AssessmentError> {
    match raw {
        "1" => Ok(LabLevel::Normal),
        "2" => Ok(LabLevel::AboveNormal),
        "3" => Ok(LabLevel::WellAboveNormal),
        _ => Err(AssessmentError::invalid(name, "must be 1, 2, or 3")),
    }
}
