use std::{fmt, sync::Arc, time::Duration};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, error};
use uuid::Uuid;

use crate::services::auth::claims::{IdentityClaims, Subject, TokenKind, TokenPair};
use crate::services::auth::clock::Clock;
use crate::services::auth::error::TokenError;

/// Everything the token service needs, passed in at construction.
#[derive(Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub issuer: String,
    pub audience: String,
    pub leeway_seconds: u64,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenConfig")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish_non_exhaustive()
    }
}

/// Signing/verification material for one token kind.
#[derive(Clone)]
struct KindKeys {
    kind: TokenKind,
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl KindKeys {
    fn new(kind: TokenKind, secret: &str, ttl: Duration, issuer: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        // Expiry is checked against the injected clock in `TokenService::verify`.
        validation.validate_exp = false;

        Self {
            kind,
            ttl,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

/// HS256 issuer/verifier for access and refresh tokens.
///
/// - Each kind has its own secret, so a token presented to the wrong verifier
///   fails on signature before the `type` claim is even read.
/// - Holds no mutable state; clone freely or share behind `Arc`.
#[derive(Clone)]
pub struct TokenService {
    access: KindKeys,
    refresh: KindKeys,
    issuer: String,
    audience: String,
    leeway_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: TokenConfig, clock: Arc<dyn Clock>) -> Self {
        let access = KindKeys::new(
            TokenKind::Access,
            &config.access_secret,
            config.access_ttl,
            &config.issuer,
            &config.audience,
        );
        let refresh = KindKeys::new(
            TokenKind::Refresh,
            &config.refresh_secret,
            config.refresh_ttl,
            &config.issuer,
            &config.audience,
        );

        Self {
            access,
            refresh,
            issuer: config.issuer,
            audience: config.audience,
            leeway_seconds: i64::try_from(config.leeway_seconds).unwrap_or(i64::MAX),
            clock,
        }
    }

    pub fn access_token_ttl_seconds(&self) -> u64 {
        self.access.ttl.as_secs()
    }

    pub fn issue_access_token(&self, subject: &Subject) -> Result<String, TokenError> {
        self.issue(&self.access, subject)
    }

    pub fn issue_refresh_token(&self, subject: &Subject) -> Result<String, TokenError> {
        self.issue(&self.refresh, subject)
    }

    /// Issue an access/refresh pair for the same subject.
    pub fn issue_token_pair(&self, subject: &Subject) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(subject)?,
            refresh_token: self.issue_refresh_token(subject)?,
            token_type: "Bearer",
            expires_in: self.access_token_ttl_seconds(),
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        self.verify(&self.access, token).inspect_err(|e| {
            error!(error = %e, "Access token verification failed");
        })
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        self.verify(&self.refresh, token).inspect_err(|e| {
            error!(error = %e, "Refresh token verification failed");
        })
    }

    fn issue(&self, keys: &KindKeys, subject: &Subject) -> Result<String, TokenError> {
        let now = self.clock.now().timestamp();
        let ttl = i64::try_from(keys.ttl.as_secs()).unwrap_or(i64::MAX);

        let claims = IdentityClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: subject.id.clone(),
            email: subject.email.clone(),
            role: subject.role.clone(),
            kind: keys.kind,
            iat: now,
            exp: now.saturating_add(ttl),
            jti: Uuid::new_v4().to_string(),
        };

        debug!(user_id = %subject.id, kind = %keys.kind, exp = claims.exp, "Issuing token");

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &keys.encoding_key).map_err(|e| {
            error!(error = %e, kind = %keys.kind, "failed to sign JWT");
            TokenError::Signing(e)
        })
    }

    /// Signature + iss/aud first, then expiry, then kind.
    fn verify(&self, keys: &KindKeys, token: &str) -> Result<IdentityClaims, TokenError> {
        let data =
            jsonwebtoken::decode::<IdentityClaims>(token, &keys.decoding_key, &keys.validation)
                .map_err(|e| TokenError::Invalid(e.to_string()))?;
        let claims = data.claims;

        let now = self.clock.now().timestamp();
        if now >= claims.exp.saturating_add(self.leeway_seconds) {
            return Err(TokenError::Expired);
        }

        if claims.kind != keys.kind {
            return Err(TokenError::WrongKind {
                expected: keys.kind,
                found: claims.kind,
            });
        }

        Ok(claims)
    }
}
