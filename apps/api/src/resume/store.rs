//! Resume persistence.
//!
//! Sections are stored as JSON text columns. Every write that touches more than one
//! statement runs inside a single transaction; an error before `commit` drops the
//! transaction, which rolls it back and leaves the previous row intact.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::info;

use crate::db::StoreError;
use crate::models::resume::{ResumeContent, ResumeSubmission, Resume, ResumeSummary};

pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Title,
    CreatedAt,
    #[default]
    UpdatedAt,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Paging and ordering for the per-user listing. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl ListQuery {
    /// Clamps out-of-range values instead of rejecting them.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePage {
    pub resumes: Vec<ResumeSummary>,
    pub total_count: i64,
    pub total_pages: i64,
    pub page: u32,
    pub page_size: u32,
}

/// Storage interface for structured resume records.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Inserts a new record and returns its assigned id.
    async fn create(&self, submission: &ResumeSubmission) -> Result<i64, StoreError>;

    async fn get(&self, id: i64) -> Result<Resume, StoreError>;

    async fn get_by_user(&self, user_id: i64, query: ListQuery) -> Result<ResumePage, StoreError>;

    /// Replaces every mutable field at once and refreshes `updated_at`.
    async fn update(&self, id: i64, content: &ResumeContent) -> Result<Resume, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Serialized section blobs
// ────────────────────────────────────────────────────────────────────────────

/// The JSON text form of every sectioned field, one per column.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionColumns {
    pub personal_info: String,
    pub experience: String,
    pub education: String,
    pub skills: String,
    pub certifications: String,
    pub projects: Option<String>,
    pub publications: Option<String>,
    pub awards: Option<String>,
    pub volunteer_work: Option<String>,
    pub references_list: Option<String>,
    pub custom_sections: Option<String>,
}

impl SectionColumns {
    pub fn encode(content: &ResumeContent) -> Result<Self, serde_json::Error> {
        let ext = &content.extended;
        Ok(Self {
            personal_info: serde_json::to_string(&content.personal_info)?,
            experience: serde_json::to_string(&content.experience)?,
            education: serde_json::to_string(&content.education)?,
            skills: serde_json::to_string(&content.skills)?,
            certifications: serde_json::to_string(&content.certifications)?,
            projects: encode_opt(&ext.projects)?,
            publications: encode_opt(&ext.publications)?,
            awards: encode_opt(&ext.awards)?,
            volunteer_work: encode_opt(&ext.volunteer_work)?,
            references_list: encode_opt(&ext.references)?,
            custom_sections: encode_opt(&ext.custom_sections)?,
        })
    }

    /// Rebuilds the sectioned part of a record; `title` and summary come from their own columns.
    pub fn decode(
        &self,
        title: String,
        professional_summary: Option<String>,
    ) -> Result<ResumeContent, serde_json::Error> {
        Ok(ResumeContent {
            title,
            personal_info: serde_json::from_str(&self.personal_info)?,
            professional_summary,
            experience: serde_json::from_str(&self.experience)?,
            education: serde_json::from_str(&self.education)?,
            skills: serde_json::from_str(&self.skills)?,
            certifications: serde_json::from_str(&self.certifications)?,
            extended: crate::models::resume::ExtendedSections {
                projects: decode_opt(&self.projects)?,
                publications: decode_opt(&self.publications)?,
                awards: decode_opt(&self.awards)?,
                volunteer_work: decode_opt(&self.volunteer_work)?,
                references: decode_opt(&self.references_list)?,
                custom_sections: decode_opt(&self.custom_sections)?,
            },
        })
    }
}

fn encode_opt(value: &Option<serde_json::Value>) -> Result<Option<String>, serde_json::Error> {
    value.as_ref().map(serde_json::to_string).transpose()
}

fn decode_opt(text: &Option<String>) -> Result<Option<serde_json::Value>, serde_json::Error> {
    text.as_deref().map(serde_json::from_str).transpose()
}

#[derive(Debug, FromRow)]
struct ResumeRow {
    id: i64,
    user_id: i64,
    title: String,
    personal_info: String,
    professional_summary: Option<String>,
    experience: String,
    education: String,
    skills: String,
    certifications: String,
    projects: Option<String>,
    publications: Option<String>,
    awards: Option<String>,
    volunteer_work: Option<String>,
    references_list: Option<String>,
    custom_sections: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ResumeRow {
    fn into_resume(self) -> Result<Resume, StoreError> {
        let sections = SectionColumns {
            personal_info: self.personal_info,
            experience: self.experience,
            education: self.education,
            skills: self.skills,
            certifications: self.certifications,
            projects: self.projects,
            publications: self.publications,
            awards: self.awards,
            volunteer_work: self.volunteer_work,
            references_list: self.references_list,
            custom_sections: self.custom_sections,
        };
        Ok(Resume {
            id: self.id,
            user_id: self.user_id,
            content: sections.decode(self.title, self.professional_summary)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SQLite implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct SqliteResumeStore {
    pool: SqlitePool,
}

impl SqliteResumeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for SqliteResumeStore {
    async fn create(&self, submission: &ResumeSubmission) -> Result<i64, StoreError> {
        let content = &submission.content;
        let sections = SectionColumns::encode(content)?;
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO resumes
                (user_id, title, personal_info, professional_summary,
                 experience, education, skills, certifications,
                 projects, publications, awards, volunteer_work, references_list, custom_sections,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(submission.user_id)
        .bind(&content.title)
        .bind(&sections.personal_info)
        .bind(&content.professional_summary)
        .bind(&sections.experience)
        .bind(&sections.education)
        .bind(&sections.skills)
        .bind(&sections.certifications)
        .bind(&sections.projects)
        .bind(&sections.publications)
        .bind(&sections.awards)
        .bind(&sections.volunteer_work)
        .bind(&sections.references_list)
        .bind(&sections.custom_sections)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        info!("Created resume {id} for user {}", submission.user_id);
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Resume, StoreError> {
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound {
                entity: "Resume",
                id,
            })?
            .into_resume()
    }

    async fn get_by_user(&self, user_id: i64, query: ListQuery) -> Result<ResumePage, StoreError> {
        let query = query.clamped();

        let total_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM resumes WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        // Column and direction come from closed enums, never from request text.
        let sql = format!(
            r#"
            SELECT id, title,
                   json_extract(personal_info, '$.fullName') AS display_name,
                   created_at, updated_at
            FROM resumes
            WHERE user_id = ?
            ORDER BY {column} {direction}, id {direction}
            LIMIT ? OFFSET ?
            "#,
            column = query.sort_field.column(),
            direction = query.sort_order.keyword(),
        );

        let offset = i64::from(query.page - 1) * i64::from(query.page_size);
        let resumes = sqlx::query_as::<_, ResumeSummary>(&sql)
            .bind(user_id)
            .bind(i64::from(query.page_size))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let page_size = i64::from(query.page_size);
        Ok(ResumePage {
            resumes,
            total_count,
            total_pages: (total_count + page_size - 1) / page_size,
            page: query.page,
            page_size: query.page_size,
        })
    }

    async fn update(&self, id: i64, content: &ResumeContent) -> Result<Resume, StoreError> {
        let sections = SectionColumns::encode(content)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        if write_header(&mut tx, id, content, &sections, now).await? == 0 {
            return Err(StoreError::NotFound {
                entity: "Resume",
                id,
            });
        }
        write_sections(&mut tx, id, &sections).await?;

        tx.commit().await?;

        info!("Updated resume {id}");
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "Resume",
                id,
            });
        }

        info!("Deleted resume {id}");
        Ok(())
    }
}

/// First half of an update: scalar fields, personal info and the timestamp.
/// Returns the number of rows touched (0 when the id does not exist).
async fn write_header(
    conn: &mut SqliteConnection,
    id: i64,
    content: &ResumeContent,
    sections: &SectionColumns,
    now: DateTime<Utc>,
) -> Result<u64, StoreError> {
    let result = sqlx::query(
        r#"
        UPDATE resumes
        SET title = ?, personal_info = ?, professional_summary = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&content.title)
    .bind(&sections.personal_info)
    .bind(&content.professional_summary)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Second half of an update: every sectioned column.
async fn write_sections(
    conn: &mut SqliteConnection,
    id: i64,
    sections: &SectionColumns,
) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        UPDATE resumes
        SET experience = ?, education = ?, skills = ?, certifications = ?,
            projects = ?, publications = ?, awards = ?, volunteer_work = ?,
            references_list = ?, custom_sections = ?
        WHERE id = ?
        "#,
    )
    .bind(&sections.experience)
    .bind(&sections.education)
    .bind(&sections.skills)
    .bind(&sections.certifications)
    .bind(&sections.projects)
    .bind(&sections.publications)
    .bind(&sections.awards)
    .bind(&sections.volunteer_work)
    .bind(&sections.references_list)
    .bind(&sections.custom_sections)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
