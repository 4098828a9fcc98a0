/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - tokens: TokenService, authorizer: Authorizer, users: UserStore, cache: JsonCache
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppEnv;
use crate::repos::UserStore;
use crate::services::auth::{Authorizer, TokenService};
use crate::services::cache::JsonCache;

#[derive(Clone)]
pub struct AppState {
    pub app_env: AppEnv,
    pub tokens: Arc<TokenService>,
    pub authorizer: Arc<Authorizer>,
    pub users: Arc<dyn UserStore>,
    pub cache: JsonCache,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        app_env: AppEnv,
        tokens: Arc<TokenService>,
        users: Arc<dyn UserStore>,
        cache: JsonCache,
    ) -> Self {
        let authorizer = Arc::new(Authorizer::new(tokens.clone(), users.clone()));
        Self {
            app_env,
            tokens,
            authorizer,
            users,
            cache,
            started_at: Instant::now(),
        }
    }
}
