use std::sync::Arc;

use crate::auth::users::UserRepository;
use crate::auth::AuthKeys;
use crate::llm_client::TextGenerator;
use crate::render::PdfRenderer;
use crate::resume::store::ResumeStore;
use crate::roadmap::store::RoadmapRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Resume persistence. One SQLite implementation in production.
    pub resumes: Arc<dyn ResumeStore>,
    pub users: UserRepository,
    pub roadmaps: RoadmapRepository,
    pub renderer: PdfRenderer,
    /// Generative-model gateway. `LlmClient` in production.
    pub llm: Arc<dyn TextGenerator>,
    pub auth: Arc<AuthKeys>,
}

#[cfg(test)]
pub mod test_support {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::AppState;
    use crate::auth::users::UserRepository;
    use crate::auth::AuthKeys;
    use crate::config::Config;
    use crate::db::test_support::test_pool;
    use crate::llm_client::{LlmError, Part, TextGenerator};
    use crate::render::PdfRenderer;
    use crate::resume::store::SqliteResumeStore;
    use crate::roadmap::store::RoadmapRepository;

    pub const TEST_JWT_SECRET: &str = "test-secret-key-at-least-32-bytes";

    /// Canned model replies. Records the parts of the most recent call.
    pub struct StubGenerator {
        reply: Option<String>,
        last_parts: Mutex<Vec<Part>>,
    }

    impl StubGenerator {
        pub fn text(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                last_parts: Mutex::new(Vec::new()),
            }
        }

        /// Every call fails as if the upstream timed out.
        pub fn timeout() -> Self {
            Self {
                reply: None,
                last_parts: Mutex::new(Vec::new()),
            }
        }

        pub fn last_parts(&self) -> Vec<Part> {
            self.last_parts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(
            &self,
            _system: Option<&str>,
            parts: Vec<Part>,
        ) -> Result<String, LlmError> {
            *self.last_parts.lock().unwrap() = parts;
            self.reply.clone().ok_or(LlmError::Timeout)
        }
    }

    pub fn test_config(dir: &Path) -> Config {
        Config {
            database_url: format!("sqlite://{}", dir.join("test.db").display()),
            db_max_connections: 1,
            db_timeout: Duration::from_secs(5),
            jwt_secret: TEST_JWT_SECRET.to_string(),
            token_ttl_hours: 1,
            gemini_api_key: "test-key".to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            llm_timeout: Duration::from_secs(5),
            public_dir: dir.join("public"),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }

    /// Full state over a fresh database and artifact directory inside `dir`.
    pub async fn test_state(dir: &Path, llm: Arc<dyn TextGenerator>) -> AppState {
        let config = test_config(dir);
        let pool = test_pool(dir).await;
        let pdf_dir: PathBuf = config.pdf_dir();

        AppState {
            resumes: Arc::new(SqliteResumeStore::new(pool.clone())),
            users: UserRepository::new(pool.clone()),
            roadmaps: RoadmapRepository::new(pool),
            renderer: PdfRenderer::new(pdf_dir),
            llm,
            auth: Arc::new(AuthKeys::new(
                config.jwt_secret.as_bytes(),
                config.token_ttl_hours,
            )),
        }
    }
}
