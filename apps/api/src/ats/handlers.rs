use axum::Json;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tracing::{info, warn};

use crate::ats::matcher::{self, AtsScore};
use crate::errors::{ApiJson, AppError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtsRequest {
    #[serde(default)]
    pub job_description: String,
    pub resume_text: Option<String>,
    /// Base64-encoded PDF. Used when `resume_text` is absent or blank.
    pub resume_pdf: Option<String>,
}

/// POST /api/ats-score
pub async fn handle_ats_score(
    ApiJson(req): ApiJson<AtsRequest>,
) -> Result<Json<AtsScore>, AppError> {
    let resume_text = match (req.resume_text, req.resume_pdf) {
        (Some(text), _) if !text.trim().is_empty() => text,
        (_, Some(pdf)) if !pdf.trim().is_empty() => pdf_to_text(&pdf).await?,
        _ => {
            return Err(AppError::Validation(
                "Provide resumeText or resumePdf".to_string(),
            ))
        }
    };

    let result = matcher::score(&req.job_description, &resume_text)?;
    info!(
        "ATS score computed: {}% ({} keywords)",
        result.percentage,
        result.matched_keywords.len()
    );
    Ok(Json(result))
}

async fn pdf_to_text(encoded: &str) -> Result<String, AppError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::Validation("resumePdf is not valid base64".to_string()))?;

    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}"))
        })?
        .map_err(|e| {
            warn!("PDF text extraction failed: {e}");
            AppError::Validation("resumePdf could not be read as a PDF".to_string())
        })
}
