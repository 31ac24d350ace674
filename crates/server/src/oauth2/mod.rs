//! OAuth2 client-credentials server.
//!
//! ## Endpoints
//!
//! - `POST /oauth/register` - Register a client (administrative credential required)
//! - `POST /oauth/token` - Client-credentials grant
//! - `GET /oauth/me` - Describe a bearer token

pub mod auth;
pub mod credentials;
pub mod endpoints;
pub mod password;
pub mod register;
pub mod scope;
pub mod token;

pub use auth::{AuthenticatedClient, BearerClient};
pub use password::{hash_secret, verify_secret};
pub use token::{AccessClaims, TokenError, TokenIssuer};

use utoipa_axum::{router::OpenApiRouter, routes};

/// OpenAPI tag for OAuth2 endpoints
pub const OAUTH2_TAG: &str = "OAuth2";

pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(register::register_client))
        .routes(routes!(endpoints::token))
        .routes(routes!(endpoints::me))
}
