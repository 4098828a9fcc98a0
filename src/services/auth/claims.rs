use std::fmt;

use serde::{Deserialize, Serialize};

use crate::services::auth::role::Role;

/// Which verification context a token belongs to.
///
/// Serialized as the `type` claim (`"access"` / `"refresh"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => f.write_str("access"),
            Self::Refresh => f.write_str("refresh"),
        }
    }
}

/// Claims embedded in every token this service signs.
///
/// NOTE:
/// - `email` is informational. Authorization decisions use the user record
///   fetched at request time, never this field.
/// - `jti` is unique per token so a denylist can key on it if one is added.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub email: String,
    pub role: Role,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl IdentityClaims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }
}

/// Identity a token is minted for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subject {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl Subject {
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: impl Into<Role>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role: role.into(),
        }
    }
}

/// Access + refresh token minted together at login/refresh time.
#[derive(Clone, Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Seconds until the access token expires.
    pub expires_in: u64,
}
