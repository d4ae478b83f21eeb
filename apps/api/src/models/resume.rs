//! The structured resume record and its sections.
//!
//! Field names serialize in camelCase, matching the JSON the front-end submits and the
//! JSON stored in the section columns. Every list defaults to empty, never null.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub start_date: String,
    /// Absent whenever `current` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub current: bool,
    pub description: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number"
    )]
    pub gpa: Option<String>,
}

/// Skills grouped into the three fixed categories, rendered in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Skills {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    pub languages: Vec<String>,
}

impl Skills {
    /// `(category, skills)` pairs in display order.
    pub fn categories(&self) -> [(&'static str, &[String]); 3] {
        [
            ("technical", &self.technical),
            ("soft", &self.soft),
            ("languages", &self.languages),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.categories().iter().all(|(_, list)| list.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Optional sections kept as opaque JSON. They are stored and returned but not rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtendedSections {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publications: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awards: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volunteer_work: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_sections: Option<Value>,
}

/// Everything a client may replace on a resume. `id`, `userId` and timestamps are excluded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeContent {
    pub title: String,
    pub personal_info: PersonalInfo,
    #[serde(alias = "objective", skip_serializing_if = "Option::is_none")]
    pub professional_summary: Option<String>,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Skills,
    pub certifications: Vec<Certification>,
    #[serde(flatten)]
    pub extended: ExtendedSections,
}

/// A validated create/update request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSubmission {
    pub user_id: i64,
    #[serde(flatten)]
    pub content: ResumeContent,
}

/// A persisted resume.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: i64,
    pub user_id: i64,
    #[serde(flatten)]
    pub content: ResumeContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List-view projection; never carries the nested sections.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSummary {
    pub id: i64,
    pub title: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// GPA arrives from form inputs as either `"3.8"` or `3.8`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_lists_default_to_empty() {
        let content: ResumeContent = serde_json::from_value(json!({
            "title": "Backend",
            "personalInfo": { "fullName": "Ada Lovelace" }
        }))
        .unwrap();
        assert!(content.experience.is_empty());
        assert!(content.education.is_empty());
        assert!(content.certifications.is_empty());
        assert!(content.skills.is_empty());
    }

    #[test]
    fn test_objective_is_accepted_as_summary() {
        let content: ResumeContent =
            serde_json::from_value(json!({ "objective": "Ship reliable systems" })).unwrap();
        assert_eq!(
            content.professional_summary.as_deref(),
            Some("Ship reliable systems")
        );
    }

    #[test]
    fn test_numeric_gpa_is_kept_as_text() {
        let edu: Education =
            serde_json::from_value(json!({ "institution": "MIT", "gpa": 3.9 })).unwrap();
        assert_eq!(edu.gpa.as_deref(), Some("3.9"));
    }

    #[test]
    fn test_object_gpa_is_rejected() {
        let result: Result<Education, _> = serde_json::from_value(json!({ "gpa": { "x": 1 } }));
        assert!(result.is_err());
    }

    #[test]
    fn test_extended_sections_flatten_into_content() {
        let content: ResumeContent = serde_json::from_value(json!({
            "projects": [{ "name": "pdfgen" }],
            "volunteerWork": []
        }))
        .unwrap();
        assert_eq!(content.extended.projects, Some(json!([{ "name": "pdfgen" }])));
        assert_eq!(content.extended.volunteer_work, Some(json!([])));

        let out = serde_json::to_value(&content).unwrap();
        assert_eq!(out["projects"], json!([{ "name": "pdfgen" }]));
        assert!(out.get("awards").is_none());
    }

    #[test]
    fn test_skill_categories_in_display_order() {
        let skills = Skills {
            technical: vec!["Rust".into()],
            soft: vec![],
            languages: vec!["French".into()],
        };
        let names: Vec<_> = skills.categories().iter().map(|(c, _)| *c).collect();
        assert_eq!(names, ["technical", "soft", "languages"]);
        assert!(!skills.is_empty());
    }
}
