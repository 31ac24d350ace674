//! Bearer authentication for routes protected by client-credentials tokens.

use crate::AppResources;
use crate::error::ApiError;
use crate::oauth2::token::TokenError;
use axum::{extract::FromRequestParts, http::request::Parts};

/// The identity proven by a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedClient {
    /// Internal client id (`sub`)
    pub subject: String,
    /// Public client identifier
    pub client_id: String,
    /// Scopes granted by the token
    pub scopes: Vec<String>,
}

/// Axum extractor that validates `Authorization: Bearer <jwt>`.
pub struct BearerClient(pub AuthenticatedClient);

impl<S> FromRequestParts<S> for BearerClient
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resources = parts.extensions.get::<AppResources>().ok_or_else(|| {
            tracing::error!("AppResources not found in extensions");
            ApiError::internal("missing application resources")
        })?;

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::InvalidToken("Missing Authorization header".into()))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::InvalidToken("Authorization header must use Bearer scheme".into())
        })?;

        let claims = resources.tokens.verify(token).map_err(|e| match e {
            TokenError::Expired => ApiError::InvalidToken("Token has expired".into()),
            other => {
                tracing::debug!(error = %other, "Rejected bearer token");
                ApiError::InvalidToken("Token is invalid".into())
            }
        })?;

        Ok(BearerClient(AuthenticatedClient {
            subject: claims.sub,
            client_id: claims.client_id,
            scopes: claims.scope,
        }))
    }
}
