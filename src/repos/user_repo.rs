/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - handler からは UserRepo trait 越しに使う (テストでは in-memory 実装に差し替え)
 * - DB エラーは RepoError に変換して返す (unique 違反は Conflict)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    #[sqlx(rename = "userId")]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// argon2 PHC string
    pub password: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    #[sqlx(rename = "profileImageUrl")]
    pub profile_image_url: Option<String>,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.name.is_none() && self.bio.is_none()
    }
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create(&self, new_user: NewUser) -> RepoResult<UserRow>;
    async fn find_by_id(&self, user_id: Uuid) -> RepoResult<Option<UserRow>>;
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRow>>;
    async fn update(&self, user_id: Uuid, changes: UserChanges) -> RepoResult<Option<UserRow>>;
    async fn delete(&self, user_id: Uuid) -> RepoResult<bool>;
}

const USER_COLUMNS: &str = r#""userId", username, email, password, name, bio, "profileImageUrl", "createdAt", "updatedAt""#;

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn create(&self, new_user: NewUser) -> RepoResult<UserRow> {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, password)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&new_user.username)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn find_by_id(&self, user_id: Uuid) -> RepoResult<Option<UserRow>> {
        let sql = format!(r#"SELECT {USER_COLUMNS} FROM users WHERE "userId" = $1"#);

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRow>> {
        let sql = format!(r#"SELECT {USER_COLUMNS} FROM users WHERE username = $1"#);

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn update(&self, user_id: Uuid, changes: UserChanges) -> RepoResult<Option<UserRow>> {
        let sql = format!(
            r#"
            UPDATE users
            SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                name = COALESCE($4, name),
                bio = COALESCE($5, bio),
                "updatedAt" = now()
            WHERE "userId" = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .bind(changes.username)
            .bind(changes.email)
            .bind(changes.name)
            .bind(changes.bio)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepoError::from_sqlx)?;

        Ok(row)
    }

    async fn delete(&self, user_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE "userId" = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
