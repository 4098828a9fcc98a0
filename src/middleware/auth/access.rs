//! access token 検証 → liveness re-check → AuthCtx を extensions に入れる
//!
//! - `apply`: 必須認証。失敗は 401 で short-circuit。
//! - `apply_optional`: 任意認証。失敗しても identity なしで handler まで進む。

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

/// ルートに必須認証を掛ける。
///
/// 例：
/// ```ignore
/// let me = Router::new().route("/me", get(me));
/// let me = middleware::auth::access::apply(me, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.route_layer(middleware::from_fn_with_state(state, authenticate))
}

/// ルートに任意認証を掛ける。token が無い/壊れている場合も request は続行する。
pub fn apply_optional(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, optional_auth))
}

// Owned copy so no borrow of the request is held across the user lookup.
fn authorization_header(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = authorization_header(&req);

    let user = match state.authorizer.authenticate(authorization.as_deref()).await {
        Ok(user) => user,
        Err(err) => {
            tracing::warn!(
                reason = %err,
                method = %req.method(),
                path = %req.uri().path(),
                "authentication rejected"
            );
            return Err(err.into());
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::from(user));

    Ok(next.run(req).await)
}

async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let authorization = authorization_header(&req);

    if let Some(user) = state
        .authorizer
        .authenticate_optional(authorization.as_deref())
        .await
    {
        req.extensions_mut().insert(AuthCtx::from(user));
    }

    next.run(req).await
}
