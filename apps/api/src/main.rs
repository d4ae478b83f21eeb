mod analysis;
mod ats;
mod auth;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod render;
mod resume;
mod roadmap;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::users::UserRepository;
use crate::auth::AuthKeys;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::render::PdfRenderer;
use crate::resume::store::SqliteResumeStore;
use crate::roadmap::store::RoadmapRepository;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting career portal API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite (migrations run here)
    let pool = create_pool(
        &config.database_url,
        config.db_max_connections,
        config.db_timeout,
    )
    .await?;

    // Initialize PDF renderer
    let renderer = PdfRenderer::new(config.pdf_dir());
    std::fs::create_dir_all(renderer.output_dir())?;
    info!("Serving PDFs from {}", renderer.output_dir().display());

    // Initialize LLM client
    let llm = LlmClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.llm_timeout,
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState {
        resumes: Arc::new(SqliteResumeStore::new(pool.clone())),
        users: UserRepository::new(pool.clone()),
        roadmaps: RoadmapRepository::new(pool),
        renderer,
        llm: Arc::new(llm),
        auth: Arc::new(AuthKeys::new(
            config.jwt_secret.as_bytes(),
            config.token_ttl_hours,
        )),
    };

    let app = build_router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
