/*
 * Responsibility
 * - Bearer トークンの検証 (ヘッダ抽出 → 検証 → 拒否)
 * - 成功時は AuthCtx を返す。extensions への格納は呼び出し側 (gate) の仕事
 * - token の中身はログに出さない
 */
use axum::http::{HeaderMap, header};

use crate::api::v1::extractors::AuthCtx;
use crate::services::auth::{AuthError, SubjectType, TokenService};

/// `Authorization: Bearer <token>` から token 部分を取り出す。
///
/// Split on the first space: exactly two parts, case-sensitive `Bearer`,
/// non-empty token. A header that is not visible ASCII counts as malformed.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?;

    let value = value
        .to_str()
        .map_err(|_| AuthError::MalformedAuthorization)?;

    if value.is_empty() {
        return Err(AuthError::MissingAuthorization);
    }

    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedAuthorization),
    }
}

/// Header → verified access token → AuthCtx.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthCtx, AuthError> {
    let token = extract_bearer(headers)?;
    let claims = tokens.verify_subject(token, SubjectType::Access)?;
    Ok(AuthCtx::from(claims))
}
