/*
 * Responsibility
 * - POST /auth/login: username + password → access/refresh の組
 * - POST /auth/refresh: Authorization: Bearer <refresh token> → 新しい組
 * - token の中身 / password はログに出さない
 */
use axum::{Json, extract::State, http::HeaderMap};

use crate::{
    api::v1::dto::auth::{LoginRequest, TokenResponse},
    error::AppError,
    middleware::bearer_auth,
    services::password::verify_password,
    state::AppState,
};

fn invalid_credentials() -> AppError {
    AppError::unauthorized("INVALID_CREDENTIALS", "invalid username or password")
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION_ERROR", m))?;

    // unknown user と password 不一致は同じ応答にする
    let Some(user) = state.users.find_by_username(&req.username).await? else {
        tracing::info!("login rejected: unknown user");
        return Err(invalid_credentials());
    };

    if !verify_password(&req.password, &user.password)? {
        tracing::info!(user_id = %user.id, "login rejected: wrong password");
        return Err(invalid_credentials());
    }

    let pair = state.tokens.issue_pair(&user.id.to_string())?;
    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(Json(pair.into()))
}

pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    let pair = bearer_auth::extract_bearer(&headers)
        .and_then(|token| state.tokens.refresh(token))
        .map_err(|err| {
            tracing::warn!(reason = err.reason(), "refresh rejected");
            AppError::from(err)
        })?;

    Ok(Json(pair.into()))
}
