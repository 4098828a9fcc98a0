/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (authenticate / optional / role gate), cors, http, security headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
