/*
 * Responsibility
 * - handler 向け extractor (認証コンテキスト / 公開 ID)
 */
pub mod auth_ctx;
pub mod public_id;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor, MaybeAuthCtx};
