use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::{ApiJson, AppError};
use crate::llm_client::Part;
use crate::models::roadmap::Roadmap;
use crate::roadmap::extract::extract_json;
use crate::roadmap::prompts::{roadmap_prompt, ROADMAP_SYSTEM};
use crate::roadmap::validation::validate_draft;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRoadmapRequest {
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub career_goal: String,
    #[serde(default)]
    pub experience_level: String,
}

/// POST /api/generate-roadmap
///
/// Nothing is written until the model reply has been parsed and validated in full.
pub async fn handle_generate_roadmap(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GenerateRoadmapRequest>,
) -> Result<Json<Roadmap>, AppError> {
    let missing: Vec<&str> = [
        ("jobDescription", &req.job_description),
        ("careerGoal", &req.career_goal),
        ("experienceLevel", &req.experience_level),
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

    let prompt = roadmap_prompt(&req.job_description, &req.career_goal, &req.experience_level);
    let reply = state
        .llm
        .generate(Some(ROADMAP_SYSTEM), vec![Part::text(prompt)])
        .await?;

    let value = extract_json(&reply)?;
    let draft = validate_draft(&value)?;

    let roadmap = state
        .roadmaps
        .create(&draft, &req.career_goal, &req.experience_level)
        .await?;
    info!("Generated roadmap {} for '{}'", roadmap.id, req.career_goal);
    Ok(Json(roadmap))
}

/// GET /api/roadmaps
pub async fn handle_list_roadmaps(
    State(state): State<AppState>,
) -> Result<Json<Vec<Roadmap>>, AppError> {
    Ok(Json(state.roadmaps.list().await?))
}

/// GET /api/roadmaps/:id
pub async fn handle_get_roadmap(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Roadmap>, AppError> {
    Ok(Json(state.roadmaps.get(id).await?))
}
