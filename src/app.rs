/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (DB pool, TokenService, ProtectedRoutes, IdCodec) → Router 組み立て
 * - Middleware の適用順を決める (gate → cors / security headers → http)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api,
    config::Config,
    middleware::{self, http::HttpLimits},
    repos::{resume_repo::PgResumeRepo, user_repo::PgUserRepo},
    services::{auth::build_token_service, id_codec::IdCodec},
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG=info,paperless_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development は即落として気付けるようにする
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("bind {}", config.addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("run migrations")?;

    let tokens = build_token_service(config)?;
    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;

    let protected = api::v1::protected_routes();
    if protected.is_empty() {
        tracing::warn!("no protected routes registered; every route is public");
    } else {
        tracing::info!(entries = protected.len(), "protected routes registered");
    }

    Ok(AppState::new(
        tokens,
        protected,
        id_codec,
        Arc::new(PgUserRepo::new(pool.clone())),
        Arc::new(PgResumeRepo::new(pool)),
    ))
}

/// gate は `Router::layer` で route ごとに掛ける (MatchedPath が見えるのはそこだけ)。
/// http layer は最後に巻くので一番外側になり、request id / trace がすべてを覆う。
pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new().nest(api::v1::PREFIX, api::v1::routes());
    let router = middleware::auth::access::apply(router, state.clone()).with_state(state);

    let router = middleware::cors::apply(router, config);
    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router, HttpLimits::from_config(config))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        // signal が取れないなら止めずに動かし続ける
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
