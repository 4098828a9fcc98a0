/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - 認証の掛け方 (必須 / 任意 / role gate) はここで route 単位に決める
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    auth::refresh,
    identity::{admin_ping, me, whoami},
};
use crate::middleware::auth::{access, role_gate};
use crate::services::auth::Role;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/auth/refresh", post(refresh));

    let optional = access::apply_optional(
        Router::new().route("/whoami", get(whoami)),
        state.clone(),
    );

    let authenticated = access::apply(Router::new().route("/me", get(me)), state.clone());

    // role gate first, then authenticate outside it (outer layer runs first)
    let admin = role_gate::apply(
        Router::new().route("/admin/ping", get(admin_ping)),
        &[Role::ADMIN],
    );
    let admin = access::apply(admin, state);

    public.merge(optional).merge(authenticated).merge(admin)
}
