pub mod health;

use std::any::Any;

use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

use crate::analysis::handlers::handle_analyze_resume;
use crate::ats::handlers::handle_ats_score;
use crate::auth::handlers::{handle_current_user, handle_login, handle_register};
use crate::errors::AppError;
use crate::resume::handlers as resumes;
use crate::roadmap::handlers as roadmaps;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let pdf_dir = state.renderer.output_dir().to_path_buf();

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/health", get(health::health_handler))
        // Users
        .route("/api/register", post(handle_register))
        .route("/api/login", post(handle_login))
        .route("/api/user", get(handle_current_user))
        // Resumes
        .route("/api/resumes", post(resumes::handle_create_resume))
        .route(
            "/api/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/users/:user_id/resumes",
            get(resumes::handle_list_user_resumes),
        )
        // Scoring and AI
        .route("/api/ats-score", post(handle_ats_score))
        .route("/api/analyze-resume", post(handle_analyze_resume))
        .route("/api/generate-roadmap", post(roadmaps::handle_generate_roadmap))
        .route("/api/roadmaps", get(roadmaps::handle_list_roadmaps))
        .route("/api/roadmaps/:id", get(roadmaps::handle_get_roadmap))
        // Rendered artifacts
        .nest_service("/pdfs", ServeDir::new(pdf_dir))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // TODO: restrict origins once the front-end host is fixed
        .with_state(state)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}
