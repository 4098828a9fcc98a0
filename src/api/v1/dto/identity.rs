use serde::Serialize;

use crate::api::v1::extractors::AuthCtx;

#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

impl From<AuthCtx> for IdentityResponse {
    fn from(ctx: AuthCtx) -> Self {
        Self {
            user_id: ctx.user_id,
            email: ctx.email,
            role: ctx.role.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub authenticated: bool,
    pub user: Option<IdentityResponse>,
}
