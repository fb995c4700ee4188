/*
 * Responsibility
 * - /users 系 handler
 * - {id} は `me` のみ受け付ける。他人の更新 / 削除は admin 権限モデルが無いので 403
 * - PUT は未対応 (404)
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::users::{CreateUserRequest, UpdateUserRequest, UserEnvelope},
        extractors::{AuthCtx, AuthCtxExtractor},
    },
    error::AppError,
    repos::{error::RepoError, user_repo::NewUser},
    services::password::hash_password,
    state::AppState,
};

const ME: &str = "me";

/// `me` → caller の UUID。token の userid が UUID でなければ token 不正扱い。
fn caller_id(ctx: &AuthCtx) -> Result<Uuid, AppError> {
    ctx.user_uuid().ok_or_else(AppError::invalid_token)
}

/// update / delete 用: `me` 以外は 403
fn writable_target(id: &str, ctx: &AuthCtx) -> Result<Uuid, AppError> {
    if id != ME {
        tracing::warn!(caller = %ctx.user_id, "write to another user denied");
        return Err(AppError::Forbidden);
    }
    caller_id(ctx)
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserEnvelope>), AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION_ERROR", m))?;

    let password_hash = hash_password(&req.password)?;

    let row = state
        .users
        .create(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            RepoError::Conflict => AppError::conflict("USER_ALREADY_EXISTS", "user already exists"),
            other => other.into(),
        })?;

    tracing::info!(user_id = %row.id, "user registered");

    Ok((StatusCode::CREATED, Json(UserEnvelope { user: row.into() })))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<UserEnvelope>, AppError> {
    // 他人のプロフィール参照は未提供
    if id != ME {
        return Err(AppError::not_found("user"));
    }

    let row = state
        .users
        .find_by_id(caller_id(&ctx)?)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(UserEnvelope { user: row.into() }))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>, AppError> {
    let user_id = writable_target(&id, &ctx)?;

    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION_ERROR", m))?;
    let changes = req.into_changes();
    if changes.is_empty() {
        return Err(AppError::bad_request("VALIDATION_ERROR", "no fields to update"));
    }

    let row = state
        .users
        .update(user_id, changes)
        .await
        .map_err(|e| match e {
            RepoError::Conflict => AppError::conflict("USER_ALREADY_EXISTS", "user already exists"),
            other => other.into(),
        })?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(UserEnvelope { user: row.into() }))
}

pub async fn replace_user() -> AppError {
    AppError::not_found("route")
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<StatusCode, AppError> {
    let user_id = writable_target(&id, &ctx)?;

    if state.users.delete(user_id).await? {
        tracing::info!(%user_id, "user deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("user"))
    }
}
