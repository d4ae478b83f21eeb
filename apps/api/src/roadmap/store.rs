use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use crate::db::StoreError;
use crate::models::roadmap::{Roadmap, RoadmapDraft};

#[derive(Debug, FromRow)]
struct RoadmapRow {
    id: i64,
    title: String,
    description: String,
    career_goal: String,
    experience_level: String,
    time_estimate: String,
    nodes: String,
    created_at: DateTime<Utc>,
}

impl RoadmapRow {
    fn into_roadmap(self) -> Result<Roadmap, StoreError> {
        Ok(Roadmap {
            id: self.id,
            title: self.title,
            description: self.description,
            career_goal: self.career_goal,
            experience_level: self.experience_level,
            time_estimate: self.time_estimate,
            nodes: serde_json::from_str(&self.nodes)?,
            created_at: self.created_at,
        })
    }
}

#[derive(Clone)]
pub struct RoadmapRepository {
    pool: SqlitePool,
}

impl RoadmapRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stores a validated draft. The request's goal and level are kept alongside it.
    pub async fn create(
        &self,
        draft: &RoadmapDraft,
        career_goal: &str,
        experience_level: &str,
    ) -> Result<Roadmap, StoreError> {
        let nodes = serde_json::to_string(&draft.nodes)?;
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO roadmaps
                (title, description, career_goal, experience_level, time_estimate, nodes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(career_goal)
        .bind(experience_level)
        .bind(&draft.time_estimate)
        .bind(&nodes)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!("Stored roadmap {id} ({} nodes)", draft.nodes.len());
        self.get(id).await
    }

    /// Newest first.
    pub async fn list(&self) -> Result<Vec<Roadmap>, StoreError> {
        sqlx::query_as::<_, RoadmapRow>("SELECT * FROM roadmaps ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(RoadmapRow::into_roadmap)
            .collect()
    }

    pub async fn get(&self, id: i64) -> Result<Roadmap, StoreError> {
        sqlx::query_as::<_, RoadmapRow>("SELECT * FROM roadmaps WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "Roadmap",
                id,
            })?
            .into_roadmap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use crate::models::roadmap::{Course, RoadmapNode};

    fn draft(title: &str) -> RoadmapDraft {
        RoadmapDraft {
            title: title.to_string(),
            description: "Path".into(),
            time_estimate: "3 months".into(),
            nodes: vec![RoadmapNode {
                title: "Async Rust".into(),
                skills: vec!["tokio".into()],
                courses: vec![Course {
                    title: "Tokio tutorial".into(),
                    topics: vec!["tasks".into()],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RoadmapRepository::new(test_pool(dir.path()).await);

        let created = repo.create(&draft("Rust"), "Systems Engineer", "mid").await.unwrap();
        assert_eq!(created.career_goal, "Systems Engineer");
        assert_eq!(created.experience_level, "mid");

        let fetched = repo.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.nodes, draft("Rust").nodes);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RoadmapRepository::new(test_pool(dir.path()).await);
        repo.create(&draft("First"), "A", "junior").await.unwrap();
        repo.create(&draft("Second"), "B", "senior").await.unwrap();

        let titles: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, ["Second", "First"]);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = RoadmapRepository::new(test_pool(dir.path()).await);
        assert!(matches!(
            repo.get(5).await,
            Err(StoreError::NotFound { entity: "Roadmap", id: 5 })
        ));
    }
}
