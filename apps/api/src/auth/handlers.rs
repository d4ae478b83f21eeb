use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{AuthError, AuthUser};
use crate::db::StoreError;
use crate::errors::{ApiJson, AppError};
use crate::models::user::{User, UserRow};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&UserRow> for PublicUser {
    fn from(row: &UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name.clone(),
            email: row.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// POST /api/register
pub async fn handle_register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let name = req.name.trim();
    let email = req.email.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password = req.password.clone();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in hashing: {e}")))?
        .map_err(AuthError::Hash)?;

    let row = match state.users.create(name, email, &hash).await {
        Ok(row) => row,
        Err(StoreError::Conflict(_)) => {
            return Err(AppError::Conflict("Email already exists".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: PublicUser::from(&row),
        }),
    ))
}

/// POST /api/login
pub async fn handle_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let login = [req.email.as_deref(), req.name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Email or name is required".to_string()))?;

    let Some(row) = state.users.find_by_login(login).await? else {
        warn!("Login failed: unknown account");
        return Err(AuthError::InvalidCredentials.into());
    };

    let password = req.password;
    let stored = row.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &stored))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in verify: {e}")))?
        .map_err(AuthError::Hash)?;
    if !valid {
        warn!("Login failed for user {}", row.id);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.auth.issue(row.id)?;
    info!("User {} logged in", row.id);
    Ok(Json(LoginResponse {
        token,
        user: PublicUser::from(&row),
    }))
}

/// GET /api/user
pub async fn handle_current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<User>, AppError> {
    let row = state.users.find_by_id(user_id).await?;
    Ok(Json(User::from(row)))
}
