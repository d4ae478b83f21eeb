//! Shape checks for incoming resume submissions.
//!
//! Runs on the raw JSON first so each violation names its field, then decodes into the
//! typed record. Identical on create and update.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::resume::ResumeSubmission;

const SKILL_CATEGORIES: [&str; 3] = ["technical", "soft", "languages"];

/// A client-side input error. Always surfaced as 400.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validates a raw submission and returns the normalized typed record.
pub fn validate_submission(raw: &Value) -> Result<ResumeSubmission, ValidationError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ValidationError::new("body", "Resume submission must be a JSON object"))?;

    check_user_id(obj)?;
    check_title(obj)?;
    require_object(obj, "personalInfo", "Invalid or missing personalInfo")?;
    require_array(obj, "experience", "Experience must be an array")?;
    require_array(obj, "education", "Education must be an array")?;
    require_array(obj, "certifications", "Certifications must be an array")?;
    require_object(obj, "skills", "Invalid or missing skills")?;
    check_skill_categories(obj)?;

    let mut submission: ResumeSubmission = serde_json::from_value(raw.clone())
        .map_err(|e| ValidationError::new("body", format!("Malformed resume submission: {e}")))?;

    normalize(&mut submission);
    Ok(submission)
}

fn check_user_id(obj: &Map<String, Value>) -> Result<(), ValidationError> {
    match obj.get("userId") {
        Some(v) if v.is_i64() => Ok(()),
        _ => Err(ValidationError::new("userId", "Invalid or missing userId")),
    }
}

fn check_title(obj: &Map<String, Value>) -> Result<(), ValidationError> {
    match obj.get("title").and_then(Value::as_str) {
        Some(t) if !t.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::new("title", "Invalid or missing title")),
    }
}

fn require_object(
    obj: &Map<String, Value>,
    field: &'static str,
    message: &str,
) -> Result<(), ValidationError> {
    match obj.get(field) {
        Some(Value::Object(_)) => Ok(()),
        _ => Err(ValidationError::new(field, message)),
    }
}

fn require_array(
    obj: &Map<String, Value>,
    field: &'static str,
    message: &str,
) -> Result<(), ValidationError> {
    match obj.get(field) {
        Some(Value::Array(_)) => Ok(()),
        _ => Err(ValidationError::new(field, message)),
    }
}

/// Only the three known categories are stored, so any other key would be lost silently.
fn check_skill_categories(obj: &Map<String, Value>) -> Result<(), ValidationError> {
    let Some(Value::Object(skills)) = obj.get("skills") else {
        return Ok(());
    };
    for key in skills.keys() {
        if !SKILL_CATEGORIES.contains(&key.as_str()) {
            return Err(ValidationError::new(
                "skills",
                format!(
                    "Unknown skills category '{key}', expected one of: {}",
                    SKILL_CATEGORIES.join(", ")
                ),
            ));
        }
    }
    Ok(())
}

/// A current position has no end date.
fn normalize(submission: &mut ResumeSubmission) {
    for exp in submission.content.experience.iter_mut() {
        if exp.current {
            exp.end_date = None;
        }
    }
}
