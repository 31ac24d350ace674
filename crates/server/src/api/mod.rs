//! HTTP surface.
//!
//! - `health` - `/ping`, `/health`, `/ready`
//! - `users` - `/users`
//! - `extract` - body extractors shared by every handler
//! - `headers` - security headers added to every response
//! - `openapi` - OpenAPI/Utoipa configuration, served at `/docs`
//!
//! OAuth2 routes live in [`crate::oauth2`] and are nested under `/oauth`.

pub mod extract;
pub mod headers;
pub mod health;
pub mod openapi;
pub mod users;

pub use health::MISC_TAG;
pub use users::USERS_TAG;

use crate::AppResources;
use crate::rate_limit;
use axum::{Router, middleware};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Build the full application router, including the Redoc UI.
pub fn app(resources: AppResources) -> Router {
    let limiter = resources.rate_limiter.clone();
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .routes(routes!(health::ping))
        .routes(routes!(health::health))
        .routes(routes!(health::ready))
        .merge(users::router())
        .nest("/oauth", crate::oauth2::router())
        .layer(middleware::from_fn_with_state(limiter, rate_limit::enforce))
        .layer(axum::Extension(resources))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    headers::with_security_headers(router.merge(Redoc::with_url("/docs", api)))
}

/// Starts the web server with all configured routes.
#[tracing::instrument(skip(resources))]
pub async fn start_webserver(resources: AppResources) -> color_eyre::Result<()> {
    let addr = resources.config.listen_addr.clone();
    let router = app(resources);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server running");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}
