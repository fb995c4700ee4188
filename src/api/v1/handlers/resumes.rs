/*
 * Responsibility
 * - /resumes 系 handler
 * - {id} は公開 ID (PublicResumeId) で受ける
 * - 参照: public OR owner (匿名可)。一覧も同じ条件で 1 件ずつ絞る
 * - 更新 / 削除: owner のみ
 * - 認証の失敗は gate / extractor 側で 401。ここで返すのは所有権の 403
 */
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    api::v1::{
        dto::resumes::{
            CreateResumeRequest, ListResumesQuery, ResumeEnvelope, ResumeListEnvelope,
            ResumeResponse, UpdateResumeRequest,
        },
        extractors::{
            AuthCtx, AuthCtxExtractor, MaybeAuthCtx, auth_ctx::can_view,
            public_id::PublicResumeId,
        },
    },
    error::AppError,
    repos::resume_repo::ResumeRow,
    state::AppState,
};

fn response(state: &AppState, row: ResumeRow) -> Result<ResumeResponse, AppError> {
    let public_id = state.id_codec.encode(row.resume_id)?;
    Ok(ResumeResponse::from_row(public_id, row))
}

fn envelope(state: &AppState, row: ResumeRow) -> Result<ResumeEnvelope, AppError> {
    Ok(ResumeEnvelope {
        resume: response(state, row)?,
    })
}

/// 存在確認 + owner 確認
async fn owned_resume(
    state: &AppState,
    resume_id: PublicResumeId,
    ctx: &AuthCtx,
) -> Result<ResumeRow, AppError> {
    let row = state
        .resumes
        .find_by_id(resume_id.id)
        .await?
        .ok_or(AppError::not_found("resume"))?;

    if !ctx.is_owner(&row.owner_id.to_string()) {
        tracing::warn!(caller = %ctx.user_id, "resume owner check failed");
        return Err(AppError::Forbidden);
    }

    Ok(row)
}

pub async fn create_resume(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<ResumeEnvelope>), AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION_ERROR", m))?;

    let owner_id = ctx.user_uuid().ok_or_else(AppError::invalid_token)?;
    let row = state.resumes.create(req.into_new(owner_id)).await?;

    Ok((StatusCode::CREATED, Json(envelope(&state, row)?)))
}

pub async fn get_resume(
    State(state): State<AppState>,
    resume_id: PublicResumeId,
    MaybeAuthCtx(viewer): MaybeAuthCtx,
) -> Result<Json<ResumeEnvelope>, AppError> {
    let row = state
        .resumes
        .find_by_id(resume_id.id)
        .await?
        .ok_or(AppError::not_found("resume"))?;

    if !can_view(viewer.as_ref(), &row.owner_id.to_string(), row.public) {
        return Err(AppError::Forbidden);
    }

    Ok(Json(envelope(&state, row)?))
}

/// `?user=` の owner の resume のうち、caller に見えるものだけ返す
pub async fn list_resumes(
    State(state): State<AppState>,
    MaybeAuthCtx(viewer): MaybeAuthCtx,
    Query(query): Query<ListResumesQuery>,
) -> Result<Json<ResumeListEnvelope>, AppError> {
    let owner_id = match query.user.as_deref() {
        Some(user) => Uuid::parse_str(user)
            .map_err(|_| AppError::bad_request("INVALID_USER_ID", "invalid user id"))?,
        None => viewer
            .as_ref()
            .and_then(AuthCtx::user_uuid)
            .ok_or_else(|| AppError::bad_request("VALIDATION_ERROR", "user is required"))?,
    };

    let owner = owner_id.to_string();
    let resumes = state
        .resumes
        .find_by_owner(owner_id)
        .await?
        .into_iter()
        .filter(|row| can_view(viewer.as_ref(), &owner, row.public))
        .map(|row| response(&state, row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ResumeListEnvelope { resumes }))
}

pub async fn update_resume(
    State(state): State<AppState>,
    resume_id: PublicResumeId,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<Json<ResumeEnvelope>, AppError> {
    owned_resume(&state, resume_id, &ctx).await?;

    req.validate()
        .map_err(|m| AppError::bad_request("VALIDATION_ERROR", m))?;

    let row = state
        .resumes
        .update(resume_id.id, req.into_changes())
        .await?
        .ok_or(AppError::not_found("resume"))?;

    Ok(Json(envelope(&state, row)?))
}

pub async fn replace_resume() -> AppError {
    AppError::not_found("route")
}

pub async fn delete_resume(
    State(state): State<AppState>,
    resume_id: PublicResumeId,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<StatusCode, AppError> {
    owned_resume(&state, resume_id, &ctx).await?;

    if state.resumes.delete(resume_id.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("resume"))
    }
}
