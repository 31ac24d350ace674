//! Cache connectivity, used by the readiness probe.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("unexpected reply to PING: {0}")]
    UnexpectedReply(String),
}

/// Something the readiness probe can ping.
#[async_trait]
pub trait CacheProbe: Send + Sync {
    async fn ping(&self) -> Result<(), CacheError>;
}

/// Redis-backed probe. The connection manager reconnects on its own, so a
/// single instance lives for the whole process.
#[derive(Clone)]
pub struct RedisProbe {
    manager: ConnectionManager,
}

impl RedisProbe {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        tracing::info!("Connected to Redis");
        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheProbe for RedisProbe {
    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(CacheError::UnexpectedReply(reply))
        }
    }
}
