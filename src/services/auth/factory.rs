/// Factory: build `TokenService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{Clock, TokenConfig, TokenService};

pub fn build_token_service(config: &Config, clock: Arc<dyn Clock>) -> Arc<TokenService> {
    let token_config = TokenConfig {
        access_secret: config.jwt_secret.clone(),
        refresh_secret: config.jwt_refresh_secret.clone(),
        access_ttl: config.access_token_ttl,
        refresh_ttl: config.refresh_token_ttl,
        issuer: config.auth_issuer.clone(),
        audience: config.auth_audience.clone(),
        leeway_seconds: config.token_leeway_seconds,
    };

    Arc::new(TokenService::new(token_config, clock))
}
