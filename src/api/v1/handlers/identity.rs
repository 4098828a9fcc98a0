/*
 * Responsibility
 * - GET /me (必須認証), GET /whoami (任意認証), GET /admin/ping (admin role)
 * - AuthCtx は middleware が extensions に入れたものを extractor 経由で受け取る
 */
use axum::Json;
use serde_json::{Value, json};

use crate::api::v1::dto::identity::{IdentityResponse, WhoAmIResponse};
use crate::api::v1::extractors::{AuthCtxExtractor, MaybeAuthCtx};

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<IdentityResponse> {
    Json(ctx.into())
}

pub async fn whoami(MaybeAuthCtx(ctx): MaybeAuthCtx) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        authenticated: ctx.is_some(),
        user: ctx.map(IdentityResponse::from),
    })
}

pub async fn admin_ping(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<Value> {
    Json(json!({ "status": "ok", "user_id": ctx.user_id }))
}
