/*
 * Responsibility
 * - Resumes の request/response DTO
 * - id は公開 ID (sqids) の文字列で返す。内部 ID は外に出さない
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::resume_repo::{
    Education, Experience, NewResume, Project, ResumeChanges, ResumeRow,
};

/// 各 section の必須文字列が空でないこと
fn validate_sections(
    experiences: Option<&[Experience]>,
    educations: Option<&[Education]>,
    projects: Option<&[Project]>,
) -> Result<(), &'static str> {
    let blank = |s: &str| s.trim().is_empty();

    if experiences
        .unwrap_or_default()
        .iter()
        .any(|e| blank(&e.company) || blank(&e.title))
    {
        return Err("experience requires company and title");
    }
    if educations.unwrap_or_default().iter().any(|e| blank(&e.school)) {
        return Err("education requires school");
    }
    if projects.unwrap_or_default().iter().any(|p| blank(&p.title)) {
        return Err("project requires title");
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    pub title: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub public: bool,
    pub template: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub educations: Vec<Education>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl CreateResumeRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        validate_sections(
            Some(&self.experiences),
            Some(&self.educations),
            Some(&self.projects),
        )
    }

    pub fn into_new(self, owner_id: uuid::Uuid) -> NewResume {
        NewResume {
            owner_id,
            title: self.title,
            bio: self.bio,
            public: self.public,
            template: self.template,
            skills: self.skills,
            experiences: self.experiences,
            educations: self.educations,
            projects: self.projects,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateResumeRequest {
    pub title: Option<String>,
    pub bio: Option<String>,
    pub public: Option<bool>,
    pub template: Option<String>,
    pub skills: Option<Vec<String>>,
    pub experiences: Option<Vec<Experience>>,
    pub educations: Option<Vec<Education>>,
    pub projects: Option<Vec<Project>>,
}

impl UpdateResumeRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(title) = &self.title
            && title.trim().is_empty()
        {
            return Err("title cannot be empty");
        }
        if self.title.is_none()
            && self.bio.is_none()
            && self.public.is_none()
            && self.template.is_none()
            && self.skills.is_none()
            && self.experiences.is_none()
            && self.educations.is_none()
            && self.projects.is_none()
        {
            return Err("no fields to update");
        }
        validate_sections(
            self.experiences.as_deref(),
            self.educations.as_deref(),
            self.projects.as_deref(),
        )
    }

    pub fn into_changes(self) -> ResumeChanges {
        ResumeChanges {
            title: self.title,
            bio: self.bio,
            public: self.public,
            template: self.template,
            skills: self.skills,
            experiences: self.experiences,
            educations: self.educations,
            projects: self.projects,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<String>,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
    pub projects: Vec<Project>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeResponse {
    pub fn from_row(public_id: String, row: ResumeRow) -> Self {
        Self {
            id: public_id,
            title: row.title,
            bio: row.bio,
            public: row.public,
            template: row.template,
            skills: row.skills,
            experiences: row.experiences.0,
            educations: row.educations.0,
            projects: row.projects.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `{"resume": {...}}`
#[derive(Debug, Serialize)]
pub struct ResumeEnvelope {
    pub resume: ResumeResponse,
}

/// `{"resumes": [...]}`
#[derive(Debug, Serialize)]
pub struct ResumeListEnvelope {
    pub resumes: Vec<ResumeResponse>,
}

/// `GET /resumes?user=<owner uuid>`。省略時は caller 自身
#[derive(Debug, Default, Deserialize)]
pub struct ListResumesQuery {
    pub user: Option<String>,
}
