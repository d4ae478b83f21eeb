//! Resume PDF rendering.
//!
//! `layout` decides what goes where, `pdf` turns positioned pages into bytes and this module
//! owns the artifact on disk. Artifacts live at `<output_dir>/resume_<id>.pdf` and are written
//! to a temporary file in the same directory first, then renamed into place. A reader never
//! sees a half-written file, and two concurrent renders of the same id leave one complete copy.

pub mod layout;
pub mod metrics;
pub mod pdf;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::models::resume::ResumeContent;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("personalInfo.fullName is required to render a resume")]
    MissingFullName,

    #[error("PDF encoding failed: {0}")]
    Encode(#[from] lopdf::Error),

    #[error("Artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes and removes rendered resume artifacts under one directory.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    output_dir: PathBuf,
    locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl PdfRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Exclusive access to the artifact of one resume. Callers hold the guard across the
    /// record write and the render or removal that follows it.
    pub async fn lock(&self, id: i64) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(id).or_default().clone();
        lock.lock_owned().await
    }

    /// Drops the lock entry of a deleted resume. Later lockers get a fresh mutex.
    pub fn forget(&self, id: i64) {
        self.locks.remove(&id);
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn artifact_path(&self, id: i64) -> PathBuf {
        self.output_dir.join(artifact_name(id))
    }

    /// URL under which the static file layer serves the artifact.
    pub fn public_url(id: i64) -> String {
        format!("/pdfs/{}", artifact_name(id))
    }

    /// Renders `content` to the artifact path for `id`, replacing any previous file.
    /// Returns the public URL.
    pub fn render(&self, id: i64, content: &ResumeContent) -> Result<String, RenderError> {
        let pages = layout::layout(content)?;
        let bytes = pdf::encode(&pages)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.output_dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;

        let path = self.artifact_path(id);
        tmp.persist(&path).map_err(|e| e.error)?;

        info!(
            "Rendered resume {id}: {} page(s), {} bytes",
            pages.len(),
            bytes.len()
        );
        Ok(Self::public_url(id))
    }

    /// Runs [`render`](Self::render) on the blocking pool.
    pub async fn render_blocking(
        &self,
        id: i64,
        content: ResumeContent,
    ) -> Result<String, RenderError> {
        let renderer = self.clone();
        tokio::task::spawn_blocking(move || renderer.render(id, &content))
            .await
            .map_err(|e| RenderError::Io(std::io::Error::other(e)))?
    }

    /// Deletes the artifact for `id`. `Ok(false)` when there was nothing to delete.
    pub fn remove(&self, id: i64) -> Result<bool, RenderError> {
        match std::fs::remove_file(self.artifact_path(id)) {
            Ok(()) => {
                info!("Removed artifact for resume {id}");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No artifact to remove for resume {id}");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn artifact_name(id: i64) -> String {
    format!("resume_{id}.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{Experience, PersonalInfo, Skills};

    fn content() -> ResumeContent {
        ResumeContent {
            title: "Platform".into(),
            personal_info: PersonalInfo {
                full_name: "Grace Hopper".into(),
                email: "grace@example.com".into(),
                phone: "555-0110".into(),
                location: "Arlington".into(),
                ..Default::default()
            },
            professional_summary: Some("Compiler pioneer.".into()),
            experience: vec![Experience {
                company: "US Navy".into(),
                position: "Rear Admiral".into(),
                start_date: "1943".into(),
                end_date: Some("1986".into()),
                current: false,
                description: "Led COBOL standardisation.".into(),
                achievements: vec!["Found the first bug".into()],
            }],
            skills: Skills {
                technical: vec!["COBOL".into(), "FLOW-MATIC".into()],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn leftover_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_render_writes_artifact_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path().join("pdfs"));

        let url = renderer.render(7, &content()).unwrap();
        assert_eq!(url, "/pdfs/resume_7.pdf");

        let bytes = std::fs::read(renderer.artifact_path(7)).unwrap();
        let text = pdf::shown_text(&bytes);
        assert_eq!(text[0], "Grace Hopper");
        let pos = |needle: &str| text.iter().position(|t| t == needle).unwrap();
        assert!(pos("Professional Summary") < pos("Professional Experience"));
        assert!(pos("Professional Experience") < pos("Skills"));
        assert!(text.contains(&"Rear Admiral at US Navy".to_string()));
        assert!(text.contains(&"COBOL, FLOW-MATIC".to_string()));
    }

    #[test]
    fn test_render_twice_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path());

        renderer.render(1, &content()).unwrap();
        let first = std::fs::read(renderer.artifact_path(1)).unwrap();
        renderer.render(1, &content()).unwrap();
        let second = std::fs::read(renderer.artifact_path(1)).unwrap();

        assert_eq!(first, second);
        assert_eq!(leftover_files(dir.path()), vec!["resume_1.pdf"]);
    }

    #[test]
    fn test_render_overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path());

        renderer.render(3, &content()).unwrap();
        let mut changed = content();
        changed.personal_info.full_name = "Amazing Grace".into();
        renderer.render(3, &changed).unwrap();

        let text = pdf::shown_text(&std::fs::read(renderer.artifact_path(3)).unwrap());
        assert_eq!(text[0], "Amazing Grace");
    }

    #[test]
    fn test_missing_full_name_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path());
        let mut c = content();
        c.personal_info.full_name.clear();

        assert!(matches!(
            renderer.render(9, &c),
            Err(RenderError::MissingFullName)
        ));
        assert!(leftover_files(dir.path()).is_empty());
    }

    #[test]
    fn test_remove_reports_whether_a_file_existed() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path());
        renderer.render(4, &content()).unwrap();

        assert!(renderer.remove(4).unwrap());
        assert!(!renderer.artifact_path(4).exists());
        assert!(!renderer.remove(4).unwrap());
    }

    #[tokio::test]
    async fn test_lock_is_exclusive_per_id() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path());

        let held = renderer.lock(5).await;
        let other_id = tokio::time::timeout(std::time::Duration::from_millis(50), renderer.lock(6));
        assert!(other_id.await.is_ok());

        let same_id = tokio::time::timeout(std::time::Duration::from_millis(50), renderer.lock(5));
        assert!(same_id.await.is_err());

        drop(held);
        renderer.forget(5);
        let _again = renderer.lock(5).await;
    }

    #[tokio::test]
    async fn test_render_blocking_matches_sync_render() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = PdfRenderer::new(dir.path());
        let url = renderer.render_blocking(11, content()).await.unwrap();
        assert_eq!(url, PdfRenderer::public_url(11));
        assert!(renderer.artifact_path(11).exists());
    }
}
