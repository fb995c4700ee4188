/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - 認証済みリクエストのコンテキスト（AuthCtx）を handler に提供する
 * - HTTP / axum 依存は core に閉じ込め、型定義は types に分離する
 *
 * Public API:
 * - AuthCtx (+ can_view)
 * - AuthCtxExtractor (必須) / MaybeAuthCtx (任意)
 */

mod core;
mod types;

pub use core::{AuthCtxExtractor, MaybeAuthCtx};
pub use types::{AuthCtx, can_view};
