//! OpenAPI/Utoipa configuration.

use crate::api::{health::MISC_TAG, users::USERS_TAG};
use crate::oauth2::OAUTH2_TAG;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{
        ClientCredentials, Flow, HttpAuthScheme, HttpBuilder, OAuth2, Scopes, SecurityScheme,
    },
};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);

        let bearer = HttpBuilder::new()
            .scheme(HttpAuthScheme::Bearer)
            .bearer_format("JWT")
            .description(Some(
                "Access token obtained from `POST /oauth/token` with the client-credentials grant.",
            ))
            .build();
        components.add_security_scheme("bearer", SecurityScheme::Http(bearer));

        let oauth2 = OAuth2::new([Flow::ClientCredentials(ClientCredentials::new(
            "/oauth/token",
            Scopes::from_iter([
                ("tasks:read", "Read tasks"),
                ("tasks:write", "Create and modify tasks"),
                ("projects:read", "Read projects"),
            ]),
        ))]);
        components.add_security_scheme("OAuth2", SecurityScheme::OAuth2(oauth2));
    }
}

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Muista API",
        version = "1.0.0",
        description = "Accounts, devices and OAuth2 client-credentials tokens."
    ),
    tags(
        (name = MISC_TAG, description = "Liveness, health and readiness"),
        (name = USERS_TAG, description = "Account signup"),
        (name = OAUTH2_TAG, description = "OAuth2 client registration and token exchange")
    )
)]
pub struct ApiDoc;
