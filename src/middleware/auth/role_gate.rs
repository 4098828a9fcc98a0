//! Role gate: 認証済み identity の role を allow-list と照合する。
//!
//! `access::apply` の内側に置くこと (AuthCtx が extensions にある前提)。

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AuthError, Role};

#[derive(Clone, Debug)]
struct AllowedRoles(Arc<[Role]>);

/// Gate every route of `router` on one of `roles`.
///
/// ```ignore
/// let admin = Router::new().route("/admin/ping", get(admin_ping));
/// let admin = role_gate::apply(admin, &[Role::ADMIN]);
/// let admin = access::apply(admin, state.clone()); // outermost: runs first
/// ```
pub fn apply<S>(router: Router<S>, roles: &[&str]) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let allowed = AllowedRoles(roles.iter().map(|r| Role::from(*r)).collect());
    router.route_layer(middleware::from_fn_with_state(allowed, role_gate))
}

/// Check an (optional) identity against an allow-list.
pub fn authorize(ctx: Option<&AuthCtx>, allowed: &[Role]) -> Result<(), AuthError> {
    let ctx = ctx.ok_or(AuthError::AuthenticationRequired)?;

    if !ctx.role.is_one_of(allowed) {
        let required: Vec<&str> = allowed.iter().map(Role::as_str).collect();
        tracing::warn!(
            user_id = %ctx.user_id,
            role = %ctx.role,
            required_roles = ?required,
            "Authorization failed"
        );
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(())
}

async fn role_gate(
    State(allowed): State<AllowedRoles>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    authorize(req.extensions().get::<AuthCtx>(), &allowed.0)?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: &str) -> AuthCtx {
        AuthCtx {
            user_id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            role: Role::from(role),
        }
    }

    #[test]
    fn missing_identity_is_authentication_required() {
        assert_eq!(
            authorize(None, &[Role::from(Role::ADMIN)]),
            Err(AuthError::AuthenticationRequired)
        );
    }

    #[test]
    fn non_member_role_is_forbidden() {
        assert_eq!(
            authorize(Some(&ctx("member")), &[Role::from(Role::ADMIN)]),
            Err(AuthError::InsufficientPermissions)
        );
    }

    #[test]
    fn any_listed_role_passes() {
        let allowed = [Role::from(Role::ADMIN), Role::from("moderator")];

        assert_eq!(authorize(Some(&ctx("admin")), &allowed), Ok(()));
        assert_eq!(authorize(Some(&ctx("moderator")), &allowed), Ok(()));
    }

    #[test]
    fn empty_allow_list_admits_nobody() {
        assert_eq!(
            authorize(Some(&ctx("admin")), &[]),
            Err(AuthError::InsufficientPermissions)
        );
    }
}
