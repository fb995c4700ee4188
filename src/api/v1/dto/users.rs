/*
 * Responsibility
 * - Users の request/response DTO
 * - password は受け取るだけで、response には絶対に載せない
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::user_repo::{UserChanges, UserRow};

const PASSWORD_MIN_LEN: usize = 8;

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if !looks_like_email(&self.email) {
            return Err("email is invalid");
        }
        if self.password.chars().count() < PASSWORD_MIN_LEN {
            return Err("password must be at least 8 characters");
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(username) = &self.username
            && username.trim().is_empty()
        {
            return Err("username cannot be empty");
        }
        if let Some(email) = &self.email
            && !looks_like_email(email)
        {
            return Err("email is invalid");
        }
        Ok(())
    }

    pub fn into_changes(self) -> UserChanges {
        UserChanges {
            username: self.username,
            email: self.email,
            name: self.name,
            bio: self.bio,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    #[serde(rename = "profileImageURL")]
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            name: row.name,
            bio: row.bio,
            profile_image_url: row.profile_image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `{"user": {...}}`
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}
