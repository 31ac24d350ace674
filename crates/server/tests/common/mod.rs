//! Shared fixtures: an in-memory SQLite schema mirroring the migrations, a
//! stub cache probe, and resource/config builders.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use muista_api::{
    AppResources,
    api::app,
    cache::{CacheError, CacheProbe},
    config::{AppConfig, JwtConfig, RateLimitConfig},
};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};
use std::sync::Arc;

pub const REGISTRATION_TOKEN: &str = "test-registration-token";
pub const JWT_SECRET: &str = "test-jwt-secret-0123456789abcdef-0123";

/// Cache probe whose health is fixed at construction.
pub struct StubCache {
    pub healthy: bool,
}

#[async_trait]
impl CacheProbe for StubCache {
    async fn ping(&self) -> Result<(), CacheError> {
        if self.healthy {
            Ok(())
        } else {
            Err(CacheError::UnexpectedReply("LOADING".into()))
        }
    }
}

pub fn create_test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        redis_url: "redis://127.0.0.1:6379/".to_string(),
        client_registration_token: REGISTRATION_TOKEN.to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            access_token_lifetime: 900,
            issuer: None,
        },
        rate_limit: RateLimitConfig::default(),
    }
}

pub async fn exec(db: &DatabaseConnection, sql: &str) {
    db.execute(Statement::from_string(DbBackend::Sqlite, sql))
        .await
        .unwrap_or_else(|e| panic!("failed to run `{sql}`: {e}"));
}

/// Create a test database with every table and the seeded scopes.
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.expect("connect");

    exec(
        &db,
        r#"CREATE TABLE oauth_client (
            id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL UNIQUE,
            client_secret_hash TEXT NOT NULL,
            name TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            owner_id TEXT NOT NULL DEFAULT 'system',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE oauth_scope (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE oauth_client_scope (
            oauth_client_id TEXT NOT NULL REFERENCES oauth_client(id) ON DELETE CASCADE,
            oauth_scope_id TEXT NOT NULL REFERENCES oauth_scope(id) ON DELETE CASCADE,
            PRIMARY KEY (oauth_client_id, oauth_scope_id)
        );"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE app_user (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            user_type TEXT NOT NULL,
            name TEXT NULL,
            phone_number TEXT NULL,
            hashed_password TEXT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );"#,
    )
    .await;

    exec(
        &db,
        r#"CREATE TABLE device (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES app_user(id) ON DELETE CASCADE,
            device_id TEXT NOT NULL UNIQUE,
            os TEXT NOT NULL,
            platform TEXT NOT NULL,
            endpoint TEXT NOT NULL,
            token TEXT NULL,
            user_agent TEXT NULL,
            last_seen_at TEXT NOT NULL,
            created_at TEXT NOT NULL
        );"#,
    )
    .await;

    exec(
        &db,
        r#"INSERT INTO oauth_scope (id, name) VALUES
            ('scope-tasks-read', 'tasks:read'),
            ('scope-tasks-write', 'tasks:write'),
            ('scope-projects-read', 'projects:read');"#,
    )
    .await;

    db
}

pub async fn create_test_resources_with(config: AppConfig, healthy_cache: bool) -> AppResources {
    let db = Arc::new(create_test_db().await);
    let cache = Arc::new(StubCache {
        healthy: healthy_cache,
    });
    AppResources::new(db, cache, Arc::new(config))
}

pub async fn create_test_resources_with_cache(healthy_cache: bool) -> AppResources {
    create_test_resources_with(create_test_config(), healthy_cache).await
}

pub async fn create_test_resources() -> AppResources {
    create_test_resources_with_cache(true).await
}

pub fn create_test_app(resources: AppResources) -> Router {
    app(resources)
}

pub async fn create_test_server() -> (TestServer, AppResources) {
    create_test_server_with_config(create_test_config()).await
}

pub async fn create_test_server_with_config(config: AppConfig) -> (TestServer, AppResources) {
    let resources = create_test_resources_with(config, true).await;
    let server = TestServer::new(create_test_app(resources.clone())).expect("create test server");
    (server, resources)
}
