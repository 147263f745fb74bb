//! Best-effort result cache.
//!
//! Records are stored as Redis hashes under `"{location}_{date}"`, one hash
//! field per [`WeatherRecord`] field. The backend is optional: when it cannot
//! be reached at startup the whole run proceeds without caching.

use async_trait::async_trait;
use redis::{AsyncCommands, aio::MultiplexedConnection};
use std::{collections::HashMap, fmt::Debug};
use tracing::{debug, warn};

use crate::{
    config::{Config, RedisConfig},
    model::WeatherRecord,
};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(#[from] redis::RedisError),

    #[error("Invalid cache configuration: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidData(String),
}

#[async_trait]
pub trait WeatherCache: Send + Sync + Debug {
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// `Ok(None)` when the key is absent; [`CacheError::InvalidData`] when it
    /// is present but does not hold a complete record.
    async fn get(&self, key: &str) -> Result<Option<WeatherRecord>, CacheError>;

    async fn set(&self, key: &str, record: &WeatherRecord) -> Result<(), CacheError>;
}

/// Redis-backed cache holding a single multiplexed connection for the run.
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
    ttl_secs: Option<u64>,
}

impl Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connect and PING, so that connection and authentication problems
    /// surface here rather than on first use.
    pub async fn connect(config: &RedisConfig) -> Result<Self, CacheError> {
        let url = config
            .connection_url()
            .map_err(|e| CacheError::Config(format!("invalid Redis address: {e}")))?;

        debug!("Connecting to Redis at {}", config.display_url());

        let client = redis::Client::open(url.as_str())?;
        let mut conn = client.get_multiplexed_async_connection().await?;

        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!("Connected to redis");

        Ok(Self {
            conn,
            ttl_secs: config.ttl_secs,
        })
    }
}

#[async_trait]
impl WeatherCache for RedisCache {
    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let found: bool = conn.exists(key).await?;
        Ok(found)
    }

    async fn get(&self, key: &str) -> Result<Option<WeatherRecord>, CacheError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> = conn.hgetall(key).await.map_err(|e| {
            // The key exists but holds something other than a hash, e.g. a bare float.
            if e.code() == Some("WRONGTYPE") {
                CacheError::InvalidData(format!("entry is not a hash: {e}"))
            } else {
                CacheError::Backend(e)
            }
        })?;

        if fields.is_empty() {
            return Ok(None);
        }

        WeatherRecord::from_fields(&fields)
            .map(Some)
            .map_err(CacheError::InvalidData)
    }

    async fn set(&self, key: &str, record: &WeatherRecord) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let fields = record.to_fields();

        let mut pipe = redis::pipe();
        pipe.atomic().hset_multiple(key, &fields).ignore();
        if let Some(ttl) = self.ttl_secs {
            pipe.expire(key, i64::try_from(ttl).unwrap_or(i64::MAX)).ignore();
        }

        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }
}

/// Resolve the cache capability once for the whole run.
///
/// Returns `None` when no backend is configured or when the configured one is
/// unreachable; the latter is logged as a single warning.
pub async fn connect_cache(config: &Config) -> Option<Box<dyn WeatherCache>> {
    let Some(redis_config) = config.redis.as_ref() else {
        debug!("No cache backend configured, caching disabled");
        return None;
    };

    match RedisCache::connect(redis_config).await {
        Ok(cache) => Some(Box::new(cache)),
        Err(e) => {
            warn!(
                "Failed to connect to redis at {}. {} Using cache disabled.",
                redis_config.display_url(),
                e
            );
            None
        }
    }
}
