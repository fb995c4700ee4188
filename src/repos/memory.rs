//! In-memory repos for handler tests (no Postgres needed).

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::resume_repo::{NewResume, ResumeChanges, ResumeRepo, ResumeRow};
use crate::repos::user_repo::{NewUser, UserChanges, UserRepo, UserRow};

#[derive(Default)]
pub struct MemoryUserRepo {
    rows: Mutex<HashMap<Uuid, UserRow>>,
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn create(&self, new_user: NewUser) -> RepoResult<UserRow> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .values()
            .any(|u| u.username == new_user.username || u.email == new_user.email)
        {
            return Err(RepoError::Conflict);
        }

        let now = Utc::now();
        let row = UserRow {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password: new_user.password_hash,
            name: None,
            bio: None,
            profile_image_url: None,
            created_at: now,
            updated_at: now,
        };
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, user_id: Uuid) -> RepoResult<Option<UserRow>> {
        Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserRow>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn update(&self, user_id: Uuid, changes: UserChanges) -> RepoResult<Option<UserRow>> {
        let mut rows = self.rows.lock().unwrap();
        if !rows.contains_key(&user_id) {
            return Ok(None);
        }

        // UNIQUE (username), UNIQUE (email) と同じ扱い
        let taken = rows.values().any(|u| {
            u.id != user_id
                && (changes.username.as_deref() == Some(u.username.as_str())
                    || changes.email.as_deref() == Some(u.email.as_str()))
        });
        if taken {
            return Err(RepoError::Conflict);
        }

        let Some(row) = rows.get_mut(&user_id) else {
            return Ok(None);
        };

        if let Some(v) = changes.username {
            row.username = v;
        }
        if let Some(v) = changes.email {
            row.email = v;
        }
        if let Some(v) = changes.name {
            row.name = Some(v);
        }
        if let Some(v) = changes.bio {
            row.bio = Some(v);
        }
        row.updated_at = Utc::now();

        Ok(Some(row.clone()))
    }

    async fn delete(&self, user_id: Uuid) -> RepoResult<bool> {
        Ok(self.rows.lock().unwrap().remove(&user_id).is_some())
    }
}

#[derive(Default)]
pub struct MemoryResumeRepo {
    rows: Mutex<HashMap<i64, ResumeRow>>,
    next_id: AtomicI64,
}

#[async_trait]
impl ResumeRepo for MemoryResumeRepo {
    async fn create(&self, new_resume: NewResume) -> RepoResult<ResumeRow> {
        let now = Utc::now();
        let row = ResumeRow {
            resume_id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            owner_id: new_resume.owner_id,
            title: new_resume.title,
            bio: new_resume.bio,
            public: new_resume.public,
            template: new_resume.template,
            skills: new_resume.skills,
            experiences: Json(new_resume.experiences),
            educations: Json(new_resume.educations),
            projects: Json(new_resume.projects),
            created_at: now,
            updated_at: now,
        };
        self.rows
            .lock()
            .unwrap()
            .insert(row.resume_id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, resume_id: i64) -> RepoResult<Option<ResumeRow>> {
        Ok(self.rows.lock().unwrap().get(&resume_id).cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<ResumeRow>> {
        let mut rows: Vec<ResumeRow> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.resume_id);
        Ok(rows)
    }

    async fn update(
        &self,
        resume_id: i64,
        changes: ResumeChanges,
    ) -> RepoResult<Option<ResumeRow>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.get_mut(&resume_id) else {
            return Ok(None);
        };

        if let Some(v) = changes.title {
            row.title = v;
        }
        if let Some(v) = changes.bio {
            row.bio = Some(v);
        }
        if let Some(v) = changes.public {
            row.public = v;
        }
        if let Some(v) = changes.template {
            row.template = Some(v);
        }
        if let Some(v) = changes.skills {
            row.skills = v;
        }
        if let Some(v) = changes.experiences {
            row.experiences = Json(v);
        }
        if let Some(v) = changes.educations {
            row.educations = Json(v);
        }
        if let Some(v) = changes.projects {
            row.projects = Json(v);
        }
        row.updated_at = Utc::now();

        Ok(Some(row.clone()))
    }

    async fn delete(&self, resume_id: i64) -> RepoResult<bool> {
        Ok(self.rows.lock().unwrap().remove(&resume_id).is_some())
    }
}
