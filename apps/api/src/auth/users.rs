use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::StoreError;
use crate::models::user::UserRow;

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts an account. A taken email surfaces as `StoreError::Conflict`.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow, StoreError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!("Registered user {}", row.id);
        Ok(row)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<UserRow, StoreError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound { entity: "User", id })
    }

    /// Login accepts either identifier: email is tried first, then display name.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<UserRow>, StoreError> {
        let by_email = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        if by_email.is_some() {
            return Ok(by_email);
        }

        Ok(
            sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE name = ? ORDER BY id LIMIT 1")
                .bind(login)
                .fetch_optional(&self.pool)
                .await?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    #[tokio::test]
    async fn test_create_and_find() {
        let dir = tempfile::tempdir().unwrap();
        let repo = UserRepository::new(test_pool(dir.path()).await);

        let created = repo.create("Ada", "ada@example.com", "hash").await.unwrap();
        assert_eq!(repo.find_by_id(created.id).await.unwrap().email, "ada@example.com");
        assert_eq!(
            repo.find_by_login("ada@example.com").await.unwrap().map(|u| u.id),
            Some(created.id)
        );
        assert_eq!(
            repo.find_by_login("Ada").await.unwrap().map(|u| u.id),
            Some(created.id)
        );
        assert!(repo.find_by_login("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let repo = UserRepository::new(test_pool(dir.path()).await);
        repo.create("Ada", "ada@example.com", "hash").await.unwrap();

        let err = repo.create("Other", "ada@example.com", "hash").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = UserRepository::new(test_pool(dir.path()).await);
        assert!(matches!(
            repo.find_by_id(3).await,
            Err(StoreError::NotFound { entity: "User", id: 3 })
        ));
    }
}
