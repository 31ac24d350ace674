//! Token endpoint and token introspection for bearer clients.

use crate::AppResources;
use crate::api::extract::JsonOrForm;
use crate::error::{ApiError, ErrorResponse};
use crate::oauth2::OAUTH2_TAG;
use crate::oauth2::auth::BearerClient;
use crate::oauth2::password::verify_secret_blocking;
use crate::oauth2::scope;
use crate::store;
use axum::{Extension, Json, http::header, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Only the client-credentials grant is supported. Any other value fails
/// deserialization and is reported as a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    ClientCredentials,
}

/// OAuth2 token request.
///
/// Carries no field rules: empty credentials fall through to `invalid_client`
/// so the response does not depend on which field was wrong.
#[derive(Deserialize, ToSchema, Validate)]
pub struct TokenRequest {
    /// Must be `client_credentials`
    pub grant_type: GrantType,
    pub client_id: String,
    pub client_secret: String,
    /// Space-separated subset of the client's granted scopes
    #[serde(default)]
    pub scope: Option<String>,
}

impl std::fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRequest")
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .finish()
    }
}

/// OAuth2 token response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    /// Space-separated scopes granted to this token
    pub scope: String,
}

#[utoipa::path(
    post,
    path = "/token",
    tag = OAUTH2_TAG,
    operation_id = "OAuth2 Token",
    summary = "Exchange client credentials for an access token",
    description = "Implements the OAuth2 client-credentials grant.\n\n\
                   Without `scope` the token carries every scope granted to the client. With \
                   `scope`, each space-separated entry must be granted; a single ungranted \
                   scope fails the whole request with `invalid_scope`.\n\n\
                   Unknown clients, inactive clients and wrong secrets all yield the same \
                   `invalid_client` response.\n\n\
                   Accepts `application/json` and `application/x-www-form-urlencoded` bodies.",
    request_body(
        description = "Token request parameters",
        content(
            (TokenRequest = "application/json"),
            (TokenRequest = "application/x-www-form-urlencoded"),
        )
    ),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Malformed request or scope not granted", body = ErrorResponse),
        (status = 401, description = "Client authentication failed", body = ErrorResponse,
            headers(("WWW-Authenticate" = String, description = "Bearer realm=\"oauth\""))),
    )
)]
#[tracing::instrument(skip_all, fields(client_id = %request.client_id))]
pub async fn token(
    Extension(resources): Extension<AppResources>,
    JsonOrForm(request): JsonOrForm<TokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let record = store::find_client_by_client_id(&resources.db, &request.client_id)
        .await
        .map_err(ApiError::internal)?;

    let (stored_hash, is_active) = match &record {
        Some(r) => (Some(r.client.client_secret_hash.clone()), r.client.is_active),
        None => (None, false),
    };

    // Verify even for unknown or inactive clients so timing stays uniform.
    let secret_matches = verify_secret_blocking(request.client_secret, stored_hash).await;

    let Some(record) = record.filter(|_| secret_matches && is_active) else {
        tracing::warn!("Client authentication failed");
        return Err(ApiError::InvalidClient);
    };

    let scopes = scope::negotiate(&record.scopes, request.scope.as_deref()).map_err(|e| {
        tracing::info!(error = %e, "Rejected scope request");
        ApiError::InvalidScope
    })?;

    let access_token = resources
        .tokens
        .sign(&record.client.id, &record.client.client_id, &scopes)
        .map_err(ApiError::internal)?;

    tracing::info!(scopes = ?scopes, "Issued access token");

    Ok((
        [(header::CACHE_CONTROL, "no-store"), (header::PRAGMA, "no-cache")],
        Json(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: resources.tokens.lifetime_secs(),
            scope: scopes.join(" "),
        }),
    ))
}

/// What a verified access token grants.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenInfo {
    /// Internal client id
    pub sub: String,
    pub client_id: String,
    pub scopes: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/me",
    tag = OAUTH2_TAG,
    operation_id = "OAuth2 Token Info",
    summary = "Describe the presented access token",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token is valid", body = TokenInfo),
        (status = 401, description = "Missing, malformed or expired token", body = ErrorResponse),
    )
)]
pub async fn me(BearerClient(client): BearerClient) -> Json<TokenInfo> {
    Json(TokenInfo {
        sub: client.subject,
        client_id: client.client_id,
        scopes: client.scopes,
    })
}
