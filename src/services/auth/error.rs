/*
 * Responsibility
 * - 認証まわり (token 発行/検証, Authorization ヘッダ) のエラー分類
 * - HTTP への変換は error.rs 側 (From<AuthError> for AppError)
 */
use thiserror::Error;

use crate::services::auth::token::SubjectType;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Secret missing or the signing primitive failed. Surfaced as 500.
    #[error("failed to sign token")]
    Signing(#[source] Option<jsonwebtoken::errors::Error>),

    /// Bad signature, broken structure, or outside the nbf/exp window.
    #[error("invalid or expired token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("expected {expected} token, got {found}")]
    WrongSubjectType {
        expected: SubjectType,
        found: SubjectType,
    },

    #[error("authorization required")]
    MissingAuthorization,

    #[error("malformed authorization header")]
    MalformedAuthorization,
}

impl AuthError {
    /// Coarse reason category for logs. Never includes caller-supplied data.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::Signing(_) => "signing_failed",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::WrongSubjectType { .. } => "wrong_subject_type",
            AuthError::MissingAuthorization => "missing_authorization",
            AuthError::MalformedAuthorization => "malformed_authorization",
        }
    }
}
