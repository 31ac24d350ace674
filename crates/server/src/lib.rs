//! Account, device and OAuth2 client-credentials API.
//!
//! Machine clients are registered with a shared administrative credential and
//! exchange their id/secret for short-lived bearer tokens. Human and service
//! accounts, with their devices, are created through the signup endpoint.

use std::sync::Arc;
use std::time::Instant;

use sea_orm::DatabaseConnection;

use crate::cache::CacheProbe;
use crate::config::AppConfig;
use crate::oauth2::TokenIssuer;
use crate::rate_limit::RateLimiter;

pub mod api;
pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod oauth2;
pub mod rate_limit;
pub mod store;
pub mod validation;

/// Process-wide collaborators, shared with every handler through an
/// `Extension` layer.
#[derive(Clone)]
pub struct AppResources {
    pub db: Arc<DatabaseConnection>,
    pub cache: Arc<dyn CacheProbe>,
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenIssuer>,
    pub rate_limiter: RateLimiter,
    pub started_at: Instant,
}

impl AppResources {
    pub fn new(
        db: Arc<DatabaseConnection>,
        cache: Arc<dyn CacheProbe>,
        config: Arc<AppConfig>,
    ) -> Self {
        let tokens = Arc::new(TokenIssuer::from_config(&config.jwt));
        let rate_limiter = RateLimiter::new(&config.rate_limit);
        Self {
            db,
            cache,
            config,
            tokens,
            rate_limiter,
            started_at: Instant::now(),
        }
    }
}
