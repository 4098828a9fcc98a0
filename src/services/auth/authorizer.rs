use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::repos::{UserRecord, UserStore};
use crate::services::auth::error::AuthError;
use crate::services::auth::token_service::TokenService;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract `<token>` from `Authorization: Bearer <token>`.
///
/// The scheme match is case-sensitive and an empty token counts as absent.
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    authorization
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .filter(|t| !t.is_empty())
}

/// Request-time gate: bearer token → verified claims → live user record.
///
/// Identity is never taken from claims alone; the user store is consulted on
/// every request so a deactivated account is rejected even with a valid token.
#[derive(Clone)]
pub struct Authorizer {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl Authorizer {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    /// Mandatory authentication. Every failure is returned to the caller.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<UserRecord, AuthError> {
        let token = bearer_token(authorization).ok_or(AuthError::MissingToken)?;

        let claims = self.tokens.verify_access_token(token)?;

        self.load_live_user(claims.user_id()).await
    }

    /// Optional authentication. Failures are absorbed; the caller just gets
    /// no identity.
    pub async fn authenticate_optional(&self, authorization: Option<&str>) -> Option<UserRecord> {
        bearer_token(authorization)?;

        match self.authenticate(authorization).await {
            Ok(user) => Some(user),
            Err(err) => {
                debug!(reason = %err, "Optional auth failed, continuing without user");
                None
            }
        }
    }

    /// Liveness re-check against the user store.
    pub async fn load_live_user(&self, user_id: &str) -> Result<UserRecord, AuthError> {
        let user = self.users.find_by_id(user_id).await.map_err(|e| {
            error!(user_id = %user_id, error = %e, "Failed to load user for liveness check");
            AuthError::TokenInvalid
        })?;

        match user {
            Some(u) if u.is_live() => Ok(u),
            _ => {
                warn!(user_id = %user_id, "Token subject not found or inactive");
                Err(AuthError::UserNotFoundOrInactive)
            }
        }
    }
}
