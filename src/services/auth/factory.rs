/// Factory: build `TokenService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{AuthError, TokenService};

pub fn build_token_service(config: &Config) -> Result<Arc<TokenService>, AuthError> {
    let tokens = TokenService::new(&config.token_settings())?;
    Ok(Arc::new(tokens))
}
