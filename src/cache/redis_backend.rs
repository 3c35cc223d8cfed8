//! Redis cache backend
//!
//! Production transport over a single multiplexed connection shared by all
//! callers. Every round-trip is bounded by the command timeout.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisResult};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::cache::CacheBackend;
use crate::error::{CacheError, Result};

/// Keys requested per SCAN round-trip during pattern deletes.
const SCAN_BATCH: usize = 500;

// == Redis Backend ==
pub struct RedisBackend {
    client: Client,
    conn: RwLock<Option<MultiplexedConnection>>,
    connect_timeout: Duration,
    command_timeout: Duration,
}

impl RedisBackend {
    /// Parses `url` and prepares a client. No connection is made until
    /// [`CacheBackend::connect`].
    pub fn new(url: &str, connect_timeout: Duration, command_timeout: Duration) -> Result<Self> {
        let client = Client::open(url)?;
        Ok(Self {
            client,
            conn: RwLock::new(None),
            connect_timeout,
            command_timeout,
        })
    }

    /// Clone of the shared connection; cheap, all clones multiplex one socket.
    fn connection(&self) -> Result<MultiplexedConnection> {
        self.conn
            .read()
            .clone()
            .ok_or_else(|| CacheError::Unavailable("redis connection not established".to_string()))
    }

    async fn run<T, F>(&self, command: &str, fut: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match timeout(self.command_timeout, fut).await {
            Ok(result) => result.map_err(CacheError::from),
            Err(_) => Err(CacheError::Timeout(format!(
                "{} exceeded {}ms",
                command,
                self.command_timeout.as_millis()
            ))),
        }
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn connect(&self) -> Result<()> {
        let conn = match timeout(
            self.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(CacheError::Timeout(format!(
                    "connect exceeded {}ms",
                    self.connect_timeout.as_millis()
                )))
            }
        };

        let mut probe = conn.clone();
        let pong: String = self
            .run("PING", redis::cmd("PING").query_async(&mut probe))
            .await?;
        debug!("Redis answered {}", pong);

        *self.conn.write() = Some(conn);
        info!("Redis connection established");
        Ok(())
    }

    async fn disconnect(&self) {
        if self.conn.write().take().is_some() {
            info!("Redis connection released");
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection()?;
        self.run("GET", conn.get(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.connection()?;
        self.run("SETEX", conn.set_ex(key, value, ttl_secs)).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection()?;
        let _removed: i64 = self.run("DEL", conn.del(key)).await?;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        let mut conn = self.connection()?;
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = self
                .run(
                    "SCAN",
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;

            if !keys.is_empty() {
                let removed: u64 = self.run("DEL", conn.del(&keys)).await?;
                deleted += removed;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Deleted {} keys matching '{}'", deleted, pattern);
        Ok(deleted)
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.connection()?;
        // Explicit MGET: the typed helper sends GET for a single key, which
        // replies with a bare value instead of an array.
        self.run("MGET", redis::cmd("MGET").arg(keys).query_async(&mut conn))
            .await
    }

    async fn mset(&self, entries: &[(String, String)], ttl_secs: u64) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection()?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in entries {
            pipe.set_ex(key, value, ttl_secs).ignore();
        }

        self.run("MULTI", pipe.query_async(&mut conn)).await
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection()?;
        let _pong: String = self
            .run("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }
}
