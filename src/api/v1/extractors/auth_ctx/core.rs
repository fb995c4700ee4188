use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::middleware::bearer_auth;
use crate::services::auth::AuthError;
use crate::state::AppState;

use super::AuthCtx;

/// Handler で、 AuthCtx を受け取るための extractor
/// middleware が AuthCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（保護されていない route で使われた・ミドルウェア未設定）
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or_else(|| AppError::unauthorized("UNAUTHORIZED", "unauthorized"))
    }
}

/// public な route 用の任意認証
///
/// - gate が AuthCtx を入れていればそれを使う
/// - Authorization ヘッダが無い / 空なら None (匿名)。空の扱いは gate と同じ
/// - ヘッダがあるのに壊れている / 無効なら 401 (匿名に落とさない)
pub struct MaybeAuthCtx(pub Option<AuthCtx>);

impl FromRequestParts<AppState> for MaybeAuthCtx {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<AuthCtx>() {
            return Ok(MaybeAuthCtx(Some(ctx.clone())));
        }

        match bearer_auth::authenticate(&parts.headers, &state.tokens) {
            Ok(ctx) => Ok(MaybeAuthCtx(Some(ctx))),
            Err(AuthError::MissingAuthorization) => Ok(MaybeAuthCtx(None)),
            Err(err) => {
                tracing::warn!(reason = err.reason(), "optional authentication rejected");
                Err(AppError::from(err))
            }
        }
    }
}
