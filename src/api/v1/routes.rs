/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - どの (method, route pattern) が access token を要求するかもここで宣言する
 *   (gate は MatchedPath で引くので、pattern は route() と同じ文字列で書く)
 */
use axum::{
    Router,
    http::Method,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    auth::{login, refresh},
    health::health,
    resumes::{
        create_resume, delete_resume, get_resume, list_resumes, replace_resume, update_resume,
    },
    users::{create_user, delete_user, get_user, replace_user, update_user},
};
use crate::services::auth::ProtectedRoutes;
use crate::state::AppState;

pub const PREFIX: &str = "/api/v1";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/users", post(create_user))
        .route(
            "/users/{id}",
            get(get_user)
                .patch(update_user)
                .put(replace_user)
                .delete(delete_user),
        )
        .route("/resumes", get(list_resumes).post(create_resume))
        .route(
            "/resumes/{id}",
            get(get_resume)
                .patch(update_resume)
                .put(replace_resume)
                .delete(delete_resume),
        )
}

/// 未登録の route は public 扱い (default-public)。
/// `/auth/refresh` は handler 側で refresh token を検証するので登録しない。
/// pattern は必ず PREFIX から組み立てる (MatchedPath は nest 後の完全な pattern)
pub fn protected_routes() -> ProtectedRoutes {
    ProtectedRoutes::new()
        .register_any(&format!("{PREFIX}/users/{{id}}"))
        .register(&format!("{PREFIX}/resumes"), &[Method::POST])
        .register(
            &format!("{PREFIX}/resumes/{{id}}"),
            &[Method::POST, Method::PUT, Method::PATCH, Method::DELETE],
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_of_resumes_stay_public() {
        let protected = protected_routes();

        assert!(!protected.is_protected(&Method::GET, "/api/v1/resumes/{id}"));
        assert!(protected.is_protected(&Method::PATCH, "/api/v1/resumes/{id}"));
        assert!(protected.is_protected(&Method::POST, "/api/v1/resumes"));
        assert!(!protected.is_protected(&Method::GET, "/api/v1/resumes"));
    }

    #[test]
    fn patterns_are_built_from_prefix() {
        let protected = protected_routes();

        // 5 (users/{id}) + 1 (POST resumes) + 4 (resumes/{id})
        assert_eq!(protected.len(), 10);
        assert!(protected.is_protected(&Method::DELETE, &format!("{PREFIX}/users/{{id}}")));
        assert!(protected.is_protected(&Method::POST, &format!("{PREFIX}/resumes")));
        assert!(!protected.is_protected(&Method::DELETE, "/users/{id}"));
    }

    #[test]
    fn every_method_on_users_is_protected() {
        let protected = protected_routes();

        for method in [Method::GET, Method::PUT, Method::PATCH, Method::DELETE] {
            assert!(protected.is_protected(&method, "/api/v1/users/{id}"), "{method}");
        }
        assert!(!protected.is_protected(&Method::POST, "/api/v1/users"));
        assert!(!protected.is_protected(&Method::POST, "/api/v1/auth/refresh"));
    }
}
