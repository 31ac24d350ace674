//! Client registration.
//!
//! `POST /oauth/register` is guarded by a shared administrative credential
//! sent in the `x-client-registration-token` header. The generated secret is
//! returned exactly once; only its hash is persisted.

use crate::AppResources;
use crate::api::extract::ValidatedJson;
use crate::entity::oauth_client::SYSTEM_OWNER;
use crate::error::{ApiError, ErrorResponse};
use crate::oauth2::OAUTH2_TAG;
use crate::oauth2::credentials::ClientCredentials;
use crate::oauth2::password::hash_secret_blocking;
use crate::store::{self, NewClient, StoreError};
use crate::validation;
use axum::{Extension, Json, extract::FromRequestParts, http::StatusCode, http::request::Parts};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use validator::Validate;

pub const REGISTRATION_HEADER: &str = "x-client-registration-token";

/// Proof that the request carried the configured registration credential.
///
/// Extracted from the headers before the body is read, so a rejected caller
/// never learns anything about body validation.
pub struct RegistrationCredential;

impl<S> FromRequestParts<S> for RegistrationCredential
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let resources = parts.extensions.get::<AppResources>().ok_or_else(|| {
            tracing::error!("AppResources not found in extensions");
            ApiError::internal("missing application resources")
        })?;

        let supplied = parts
            .headers
            .get(REGISTRATION_HEADER)
            .map(|v| v.as_bytes())
            .unwrap_or_default();
        let expected = resources.config.client_registration_token.as_bytes();

        if bool::from(supplied.ct_eq(expected)) {
            Ok(RegistrationCredential)
        } else {
            tracing::warn!(
                header_present = !supplied.is_empty(),
                "Rejected client registration attempt"
            );
            Err(ApiError::Forbidden)
        }
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterClientRequest {
    /// Display name of the client (at least 3 characters)
    #[schema(example = "svc-a", min_length = 3)]
    #[validate(length(min = 3, message = "name must be at least 3 characters long"))]
    pub name: String,
    /// Scope names to grant. Every name must already exist.
    #[serde(default)]
    #[schema(example = json!(["tasks:read"]))]
    pub scopes: Option<Vec<String>>,
    /// Owning principal. Defaults to `system`.
    #[serde(default, rename = "ownerId")]
    #[validate(custom(function = "validation::not_blank", message = "ownerId must not be empty"))]
    pub owner_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterClientResponse {
    pub id: String,
    pub client_id: String,
    /// Plaintext secret. Shown only in this response.
    pub client_secret: String,
    pub scopes: Vec<String>,
    #[serde(rename = "ownerId")]
    pub owner_id: String,
}

#[utoipa::path(
    post,
    path = "/register",
    tag = OAUTH2_TAG,
    operation_id = "OAuth2 Register Client",
    summary = "Register a client-credentials client",
    description = "Creates a machine client and returns its `client_id` and `client_secret`.\n\n\
                   **The secret is returned only once.** It is stored as an Argon2id hash and \
                   cannot be retrieved again.\n\n\
                   Requires the `x-client-registration-token` header; the header is checked \
                   before the body is parsed. Every scope name must already exist.",
    params(
        ("x-client-registration-token" = String, Header, description = "Administrative registration credential"),
    ),
    request_body(
        content = RegisterClientRequest,
        content_type = "application/json",
        description = "Client registration parameters"
    ),
    responses(
        (status = 201, description = "Client registered", body = RegisterClientResponse),
        (status = 400, description = "Validation failure or unknown scope", body = ErrorResponse),
        (status = 403, description = "Missing or wrong registration credential", body = ErrorResponse),
        (status = 409, description = "Identifier collision", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all, fields(name = %request.name))]
pub async fn register_client(
    _credential: RegistrationCredential,
    Extension(resources): Extension<AppResources>,
    ValidatedJson(request): ValidatedJson<RegisterClientRequest>,
) -> Result<(StatusCode, Json<RegisterClientResponse>), ApiError> {
    let ClientCredentials {
        client_id,
        client_secret,
    } = ClientCredentials::generate().map_err(ApiError::internal)?;

    let client_secret_hash = hash_secret_blocking(client_secret.clone())
        .await
        .map_err(ApiError::internal)?;

    let new_client = NewClient {
        name: request.name,
        client_id,
        client_secret_hash,
        owner_id: request
            .owner_id
            .unwrap_or_else(|| SYSTEM_OWNER.to_string()),
        scopes: request.scopes.unwrap_or_default(),
    };

    let record = store::insert_client(&resources.db, new_client)
        .await
        .map_err(|e| match e {
            StoreError::UnknownScopes(names) => ApiError::UnknownScope(names),
            StoreError::Conflict { field } => ApiError::Conflict {
                resource: "client",
                field,
            },
            StoreError::Database(err) => ApiError::internal(err),
        })?;

    tracing::info!(
        client_id = %record.client.client_id,
        scopes = ?record.scopes,
        "Registered OAuth client"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterClientResponse {
            id: record.client.id,
            client_id: record.client.client_id,
            client_secret,
            scopes: record.scopes,
            owner_id: record.client.owner_id,
        }),
    ))
}
