use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::parser::{parse_analysis, AnalysisOutcome};
use crate::analysis::prompts::ANALYSIS_FORMAT_SYSTEM;
use crate::errors::{ApiJson, AppError};
use crate::llm_client::Part;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Base64 PDF, optionally as a `data:` URL.
    #[serde(default)]
    pub pdf: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// The model's reply, untouched.
    pub response: String,
    pub analysis: AnalysisOutcome,
}

/// POST /api/analyze-resume
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let missing: Vec<&str> = [
        ("pdf", &req.pdf),
        ("jobDescription", &req.job_description),
        ("prompt", &req.prompt),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let pdf = strip_data_url(&req.pdf);
    STANDARD
        .decode(pdf)
        .map_err(|_| AppError::Validation("pdf is not valid base64".to_string()))?;

    let parts = vec![
        Part::text(req.prompt),
        Part::inline("application/pdf", pdf),
        Part::text(req.job_description),
    ];
    let response = state
        .llm
        .generate(Some(ANALYSIS_FORMAT_SYSTEM), parts)
        .await?;

    let analysis = parse_analysis(&response);
    info!(
        "Resume analysis completed ({})",
        match &analysis {
            AnalysisOutcome::Parsed(_) => "parsed",
            AnalysisOutcome::Unparseable { .. } => "unparseable",
        }
    );

    Ok(Json(AnalyzeResponse { response, analysis }))
}

fn strip_data_url(pdf: &str) -> &str {
    let pdf = pdf.trim();
    match pdf.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => pdf,
    }
}
