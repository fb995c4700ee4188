/*
 * Responsibility
 * - Path の公開 ID (sqids) を受けて内部 ID (i64) に復号する extractor
 * - 失敗は 400 (AppError) に寄せる
 * - 具体的なリソース名は types.rs 側に置く
 */
use std::marker::PhantomData;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

pub struct PublicId<T> {
    pub id: i64,
    _marker: PhantomData<T>,
}

impl<T> PublicId<T> {
    fn new(id: i64) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }
}

// derive だと T: Clone を要求されるため手で書く
impl<T> Clone for PublicId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PublicId<T> {}

impl<T> std::fmt::Debug for PublicId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicId").field("id", &self.id).finish()
    }
}

/// どのリソースの ID かを型で表す。エラーコードもここから引く。
pub trait IdKind {
    const INVALID_CODE: &'static str;
    const INVALID_MESSAGE: &'static str;
}

impl<T> FromRequestParts<AppState> for PublicId<T>
where
    T: IdKind + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let invalid = || AppError::bad_request(T::INVALID_CODE, T::INVALID_MESSAGE);

        let Path(public_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid())?;

        let id = state.id_codec.decode(&public_id).map_err(|_| invalid())?;
        Ok(Self::new(id))
    }
}
