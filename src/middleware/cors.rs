//! CORS policy for the browser front-end.
//!
//! - development: 任意 origin を許可 (credentials なし)
//! - production: `CORS_ALLOWED_ORIGINS` の完全一致のみ。空なら CORS ヘッダを返さない
//!
//! Authorization ヘッダで Bearer を送るため、cookie 用の credentials は常に無効。

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;
use crate::middleware::http::REQUEST_ID_HEADER;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(10 * 60);

fn allow_origin(config: &Config) -> AllowOrigin {
    if !config.app_env.is_production() {
        return AllowOrigin::from(Any);
    }

    let allowed: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    AllowOrigin::list(allowed)
}

pub fn layer(config: &Config) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allow_origin(config))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(PREFLIGHT_MAX_AGE)
}

pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(layer(config))
}
