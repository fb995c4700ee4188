/**
 * Responsibility
 *  - リソースごとの「意味付き ID 型」を宣言する
 *  - 新しいリソースを公開 ID で扱うときはここに足す
 */
use super::core::{IdKind, PublicId};

// resumes
pub enum ResumeTag {}

impl IdKind for ResumeTag {
    const INVALID_CODE: &'static str = "INVALID_RESUME_ID";
    const INVALID_MESSAGE: &'static str = "invalid resume id";
}

pub type PublicResumeId = PublicId<ResumeTag>;
