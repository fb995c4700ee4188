/*
 * Responsibility
 * - module 宣言と tokio runtime の起動だけ
 * - 起動手順そのものは app::run()
 */
mod api;
mod app;
mod config;
mod error;
mod middleware;
mod repos;
mod services;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
