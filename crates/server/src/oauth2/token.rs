//! Access token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with the process-wide key from
//! [`JwtConfig`]. The issuer is built once at startup and shared; signing is
//! stateless, so nothing is recorded per token.

use crate::config::JwtConfig;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// Claims carried by every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Internal id of the client the token was issued to
    pub sub: String,
    /// Public client identifier
    pub client_id: String,
    /// Negotiated scopes, in the order they were granted for this token
    pub scope: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token is invalid: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: i64,
    issuer: Option<String>,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], lifetime: i64, issuer: Option<String>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime,
            issuer,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Self {
        Self::new(
            config.secret.as_bytes(),
            config.access_token_lifetime,
            config.issuer.clone(),
        )
    }

    /// Lifetime of issued tokens, reported to callers as `expires_in`.
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime
    }

    pub fn sign(
        &self,
        subject: &str,
        client_id: &str,
        scopes: &[String],
    ) -> Result<String, TokenError> {
        let iat = OffsetDateTime::now_utc().unix_timestamp();
        let claims = AccessClaims {
            sub: subject.to_string(),
            client_id: client_id.to_string(),
            scope: scopes.to_vec(),
            iat,
            exp: iat + self.lifetime,
            iss: self.issuer.clone(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        jsonwebtoken::decode::<AccessClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("lifetime", &self.lifetime)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn scopes() -> Vec<String> {
        vec!["tasks:read".into(), "projects:read".into()]
    }

    #[test]
    fn test_sign_and_verify_roundtrip_claims() {
        let issuer = TokenIssuer::new(SECRET, 3600, None);
        let token = issuer.sign("internal-1", "public-1", &scopes()).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "internal-1");
        assert_eq!(claims.client_id, "public-1");
        assert_eq!(claims.scope, scopes());
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.iss.is_none());
    }

    #[test]
    fn test_rejects_other_key() {
        let token = TokenIssuer::new(SECRET, 60, None)
            .sign("a", "b", &[])
            .unwrap();
        let other = TokenIssuer::new(b"ffffffffffffffffffffffffffffffff", 60, None);
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_rejects_expired_token() {
        let issuer = TokenIssuer::new(SECRET, -120, None);
        let token = issuer.sign("a", "b", &[]).unwrap();
        assert!(matches!(issuer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_issuer_is_enforced() {
        let ours = TokenIssuer::new(SECRET, 60, Some("https://auth.muista.test".into()));
        let theirs = TokenIssuer::new(SECRET, 60, Some("https://elsewhere.test".into()));

        let token = ours.sign("a", "b", &[]).unwrap();
        assert_eq!(
            ours.verify(&token).unwrap().iss.as_deref(),
            Some("https://auth.muista.test")
        );
        assert!(theirs.verify(&token).is_err());
    }

    #[test]
    fn test_garbage_is_invalid() {
        let issuer = TokenIssuer::new(SECRET, 60, None);
        assert!(matches!(
            issuer.verify("not.a.jwt"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_debug_hides_keys() {
        let issuer = TokenIssuer::new(SECRET, 60, None);
        let printed = format!("{issuer:?}");
        assert!(!printed.contains("0123456789abcdef"));
    }
}
