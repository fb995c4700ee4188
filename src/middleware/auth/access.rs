//! access token 検証 gate → AuthCtx を extensions に入れる
//!
//! - axum が解決した route pattern (`MatchedPath`) と method で ProtectedRoutes を引く
//! - 未登録なら素通し (default-public)
//! - 登録済みなら Bearer を検証し、access token であることを要求する
//! - 失敗はすべて 401 で打ち切り、handler は実行しない

use axum::{
    Router,
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::middleware::bearer_auth;
use crate::state::AppState;

/// Router 全体に gate を掛ける。
///
/// `Router::layer` で掛けること（`MatchedPath` は route 解決後に入るため、
/// Router の外側に ServiceBuilder で巻くと常に未登録扱いになる）。
///
/// 例：
/// ```ignore
/// let app = Router::new().nest("/api/v1", api::v1::routes());
/// let app = middleware::auth::access::apply(app, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let protected = req
        .extensions()
        .get::<MatchedPath>()
        .is_some_and(|path| state.protected.is_protected(req.method(), path.as_str()));

    if !protected {
        return Ok(next.run(req).await);
    }

    let auth_ctx = match bearer_auth::authenticate(req.headers(), &state.tokens) {
        Ok(ctx) => ctx,
        Err(err) => {
            // reason only; never the header or token
            tracing::warn!(
                reason = err.reason(),
                method = %req.method(),
                "access token verification failed"
            );
            return Err(err.into());
        }
    };

    tracing::debug!(user_id = %auth_ctx.user_id, roles = ?auth_ctx.roles, "authenticated");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::to_bytes,
        http::{Method, StatusCode, header},
        routing::get,
    };
    use chrono::{Duration as ChronoDuration, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::api::v1::extractors::{AuthCtx, AuthCtxExtractor};
    use crate::services::auth::{ProtectedRoutes, SubjectType};
    use crate::state::test_state_with;

    async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
        ctx.user_id
    }

    async fn open(req: Request<Body>) -> String {
        // public route: the gate must not attach anything
        match req.extensions().get::<AuthCtx>() {
            Some(_) => "attached".to_string(),
            None => "anonymous".to_string(),
        }
    }

    fn app() -> (Router, AppState) {
        let protected = ProtectedRoutes::new()
            .register("/things/{id}", &[Method::POST])
            .register_any("/me");
        let state = test_state_with(protected);

        let router = Router::new()
            .route("/me", get(whoami))
            .route("/things/{id}", get(open).post(whoami));
        let router = apply(router, state.clone()).with_state(state.clone());

        (router, state)
    }

    fn request(method: Method, uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(router: Router, req: Request<Body>) -> (StatusCode, String) {
        let res = router.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn error_code(body: &str) -> String {
        let v: Value = serde_json::from_str(body).unwrap();
        v["error"]["code"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn valid_access_token_attaches_identity() {
        let (router, state) = app();
        let token = state.tokens.issue("u1", SubjectType::Access).unwrap();

        let (status, body) = send(
            router,
            request(Method::GET, "/me", Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "u1");
    }

    #[tokio::test]
    async fn missing_header_is_401() {
        let (router, _) = app();

        let (status, body) = send(router, request(Method::GET, "/me", None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&body), "AUTHORIZATION_REQUIRED");
    }

    #[tokio::test]
    async fn wrong_scheme_is_401() {
        let (router, _) = app();

        let (status, body) = send(router, request(Method::GET, "/me", Some("Token abc"))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&body), "MALFORMED_AUTHORIZATION_HEADER");
    }

    #[tokio::test]
    async fn garbage_token_is_401() {
        let (router, _) = app();

        let (status, body) =
            send(router, request(Method::GET, "/me", Some("Bearer not.a.jwt"))).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&body), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn expired_token_is_401() {
        let (router, state) = app();
        let issued = Utc::now() - ChronoDuration::days(2);
        let token = state
            .tokens
            .issue_at("u1", SubjectType::Access, issued)
            .unwrap();

        let (status, _) = send(
            router,
            request(Method::GET, "/me", Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_credential() {
        let (router, state) = app();
        let token = state.tokens.issue("u1", SubjectType::Refresh).unwrap();

        let (status, body) = send(
            router,
            request(Method::GET, "/me", Some(&format!("Bearer {token}"))),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&body), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn protection_is_per_method() {
        let (router, _) = app();

        // GET /things/{id} is not registered: passes through untouched
        let (status, body) = send(router.clone(), request(Method::GET, "/things/42", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");

        // POST /things/{id} is registered
        let (status, _) = send(router, request(Method::POST, "/things/42", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unprotected_route_ignores_bad_header() {
        let (router, _) = app();

        let (status, body) = send(
            router,
            request(Method::GET, "/things/42", Some("Token abc")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn unknown_route_falls_through_to_404() {
        let (router, _) = app();

        let (status, _) = send(router, request(Method::GET, "/nope", None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
