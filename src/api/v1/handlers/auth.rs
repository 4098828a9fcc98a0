/*
 * Responsibility
 * - POST /auth/refresh (refresh token → 新しい token pair)
 * - refresh token 検証 + liveness re-check は services 側
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::api::v1::dto::auth::{RefreshRequest, TokenResponse};
use crate::error::AppError;
use crate::state::AppState;

pub async fn refresh(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    // Malformed or mistyped bodies go through the same error envelope as validation failures.
    let Json(req) = body.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "refresh body rejected");
        AppError::bad_request("VALIDATION_FAILED", "Invalid request body")
    })?;

    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION_FAILED", msg))?;

    let claims = state.tokens.verify_refresh_token(&req.refresh_token)?;

    // Same liveness rule as access tokens: a deactivated account cannot mint new tokens.
    let user = state
        .authorizer
        .load_live_user(claims.user_id())
        .await
        .inspect_err(|e| tracing::warn!(reason = %e, "refresh rejected"))?;

    let pair = state.tokens.issue_token_pair(&user.subject())?;

    tracing::info!(user_id = %user.id, "token pair refreshed");

    Ok(Json(pair.into()))
}
