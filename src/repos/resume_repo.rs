/*
 * Responsibility
 * - resumes CRUD
 * - "ownerId" は users."userId" への FK (CASCADE) 前提
 * - 可視性 / 所有者チェックは handler 側 (AuthCtx を見る)、ここは保存だけ
 * - experiences / educations / projects は resume の一部としてまとめて読み書きするので JSONB
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub major: String,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResumeRow {
    #[sqlx(rename = "resumeId")]
    pub resume_id: i64,

    #[sqlx(rename = "ownerId")]
    pub owner_id: Uuid,

    pub title: String,
    pub bio: Option<String>,
    pub public: bool,
    pub template: Option<String>,
    pub skills: Vec<String>,
    pub experiences: Json<Vec<Experience>>,
    pub educations: Json<Vec<Education>>,
    pub projects: Json<Vec<Project>>,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[sqlx(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewResume {
    pub owner_id: Uuid,
    pub title: String,
    pub bio: Option<String>,
    pub public: bool,
    pub template: Option<String>,
    pub skills: Vec<String>,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Default)]
pub struct ResumeChanges {
    pub title: Option<String>,
    pub bio: Option<String>,
    pub public: Option<bool>,
    pub template: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experiences: Option<Vec<Experience>>,
    pub educations: Option<Vec<Education>>,
    pub projects: Option<Vec<Project>>,
}

#[async_trait]
pub trait ResumeRepo: Send + Sync {
    async fn create(&self, new_resume: NewResume) -> RepoResult<ResumeRow>;
    async fn find_by_id(&self, resume_id: i64) -> RepoResult<Option<ResumeRow>>;
    /// 古い順 (resumeId 昇順)。可視性の絞り込みは呼び出し側
    async fn find_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<ResumeRow>>;
    async fn update(&self, resume_id: i64, changes: ResumeChanges)
    -> RepoResult<Option<ResumeRow>>;
    async fn delete(&self, resume_id: i64) -> RepoResult<bool>;
}

const RESUME_COLUMNS: &str = r#""resumeId", "ownerId", title, bio, public, template, skills,
    experiences, educations, projects, "createdAt", "updatedAt""#;

#[derive(Clone, Debug)]
pub struct PgResumeRepo {
    pool: PgPool,
}

impl PgResumeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeRepo for PgResumeRepo {
    async fn create(&self, new_resume: NewResume) -> RepoResult<ResumeRow> {
        let sql = format!(
            r#"
            INSERT INTO resumes
                ("ownerId", title, bio, public, template, skills, experiences, educations, projects)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {RESUME_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ResumeRow>(&sql)
            .bind(new_resume.owner_id)
            .bind(new_resume.title)
            .bind(new_resume.bio)
            .bind(new_resume.public)
            .bind(new_resume.template)
            .bind(new_resume.skills)
            .bind(Json(new_resume.experiences))
            .bind(Json(new_resume.educations))
            .bind(Json(new_resume.projects))
            .fetch_one(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn find_by_id(&self, resume_id: i64) -> RepoResult<Option<ResumeRow>> {
        let sql = format!(r#"SELECT {RESUME_COLUMNS} FROM resumes WHERE "resumeId" = $1"#);

        let row = sqlx::query_as::<_, ResumeRow>(&sql)
            .bind(resume_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<ResumeRow>> {
        let sql = format!(
            r#"SELECT {RESUME_COLUMNS} FROM resumes WHERE "ownerId" = $1 ORDER BY "resumeId""#
        );

        let rows = sqlx::query_as::<_, ResumeRow>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn update(
        &self,
        resume_id: i64,
        changes: ResumeChanges,
    ) -> RepoResult<Option<ResumeRow>> {
        let sql = format!(
            r#"
            UPDATE resumes
            SET
                title = COALESCE($2, title),
                bio = COALESCE($3, bio),
                public = COALESCE($4, public),
                template = COALESCE($5, template),
                skills = COALESCE($6, skills),
                experiences = COALESCE($7, experiences),
                educations = COALESCE($8, educations),
                projects = COALESCE($9, projects),
                "updatedAt" = now()
            WHERE "resumeId" = $1
            RETURNING {RESUME_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ResumeRow>(&sql)
            .bind(resume_id)
            .bind(changes.title)
            .bind(changes.bio)
            .bind(changes.public)
            .bind(changes.template)
            .bind(changes.skills)
            .bind(changes.experiences.map(Json))
            .bind(changes.educations.map(Json))
            .bind(changes.projects.map(Json))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn delete(&self, resume_id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM resumes
            WHERE "resumeId" = $1
            "#,
        )
        .bind(resume_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
