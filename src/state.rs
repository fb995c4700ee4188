/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - tokens: TokenService, protected: ProtectedRoutes, repos, id_codec
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - 起動後は読み取り専用 (lock なし)
 */
use std::sync::Arc;

use crate::repos::{resume_repo::ResumeRepo, user_repo::UserRepo};
use crate::services::{
    auth::{ProtectedRoutes, TokenService},
    id_codec::IdCodec,
};

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub protected: Arc<ProtectedRoutes>,
    pub id_codec: IdCodec,
    pub users: Arc<dyn UserRepo>,
    pub resumes: Arc<dyn ResumeRepo>,
}

impl AppState {
    pub fn new(
        tokens: Arc<TokenService>,
        protected: ProtectedRoutes,
        id_codec: IdCodec,
        users: Arc<dyn UserRepo>,
        resumes: Arc<dyn ResumeRepo>,
    ) -> Self {
        Self {
            tokens,
            protected: Arc::new(protected),
            id_codec,
            users,
            resumes,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("protected", &self.protected)
            .field("id_codec", &self.id_codec)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) fn test_state_with(protected: ProtectedRoutes) -> AppState {
    use crate::repos::memory::{MemoryResumeRepo, MemoryUserRepo};
    use crate::services::auth::token::tests::test_service;

    let id_codec = IdCodec::new(
        10,
        "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789",
    )
    .unwrap();

    AppState::new(
        Arc::new(test_service()),
        protected,
        id_codec,
        Arc::new(MemoryUserRepo::default()),
        Arc::new(MemoryResumeRepo::default()),
    )
}
