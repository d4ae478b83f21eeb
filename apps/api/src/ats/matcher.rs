//! Keyword-overlap scoring of a resume against a job description.
//!
//! Pure and deterministic. Both texts are lowercased and split on runs of characters
//! outside `[A-Za-z0-9_]`; empty pieces from leading or trailing punctuation are dropped.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

/// Resume tokens of this length or shorter never count as matches.
const MIN_KEYWORD_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtsError {
    #[error("Job description contains no words to match against")]
    EmptyJobDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsScore {
    /// Unique matches over job-description tokens, as a percentage with one decimal.
    pub percentage: f64,
    /// Unique matches in the order they first appear in the resume.
    pub matched_keywords: Vec<String>,
    /// Job-description token count, duplicates included. The percentage denominator.
    pub job_description_tokens: usize,
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn score(job_description: &str, resume: &str) -> Result<AtsScore, AtsError> {
    let jd_tokens = tokenize(job_description);
    if jd_tokens.is_empty() {
        return Err(AtsError::EmptyJobDescription);
    }
    let jd_set: HashSet<&str> = jd_tokens.iter().map(String::as_str).collect();

    let mut seen = HashSet::new();
    let matched_keywords: Vec<String> = tokenize(resume)
        .into_iter()
        .filter(|t| t.len() > MIN_KEYWORD_LEN && jd_set.contains(t.as_str()))
        .filter(|t| seen.insert(t.clone()))
        .collect();

    let raw = matched_keywords.len() as f64 / jd_tokens.len() as f64 * 100.0;
    Ok(AtsScore {
        percentage: (raw * 10.0).round() / 10.0,
        matched_keywords,
        job_description_tokens: jd_tokens.len(),
    })
}
