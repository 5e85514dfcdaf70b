//! Connection pool lifecycle.
//!
//! [`Db`] owns the process-wide pool. It replaces a hidden global with an
//! explicit handle: the bootstrap calls [`Db::connect`] once, passes the
//! handle (it is cheap to clone) to everything that touches the database,
//! and calls [`Db::close`] at teardown. Concurrent initialization is not
//! serialized here; callers are expected to connect before spawning work.

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::{Executor, MySql, Transaction};
use tracing::info;

use crate::config::DbConfig;
use crate::error::{Result, WeftError};

/// Handle to the connection pool. Clones share the same pool.
#[derive(Debug, Clone)]
pub struct Db {
    pool: MySqlPool,
    acquire_timeout: Duration,
}

impl Db {
    /// Create the connection pool.
    ///
    /// `min_size` connections are kept warm; `max_size` is the hard ceiling
    /// on concurrently checked-out connections. Waiting longer than the
    /// configured acquire timeout fails with [`WeftError::PoolExhausted`].
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "create database connection pool"
        );

        let connect = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .charset(&config.charset);

        let mut options = MySqlPoolOptions::new()
            .min_connections(config.min_size)
            .max_connections(config.max_size)
            .acquire_timeout(config.acquire_timeout());
        if !config.autocommit {
            options = options.after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("set autocommit = 0").await?;
                    Ok(())
                })
            });
        }

        let pool = options.connect_with(connect).await?;
        Ok(Self {
            pool,
            acquire_timeout: config.acquire_timeout(),
        })
    }

    /// The underlying sqlx pool, for queries outside the entity runtime.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Check out a connection; released back to the pool on drop.
    pub(crate) async fn acquire(&self) -> Result<PoolConnection<MySql>> {
        self.pool.acquire().await.map_err(|err| self.map_pool_err(err))
    }

    /// Begin a transaction on a checked-out connection.
    pub(crate) async fn begin(&self) -> Result<Transaction<'static, MySql>> {
        self.pool.begin().await.map_err(|err| self.map_pool_err(err))
    }

    fn map_pool_err(&self, err: sqlx::Error) -> WeftError {
        match err {
            sqlx::Error::PoolTimedOut => WeftError::PoolExhausted {
                waited: self.acquire_timeout,
            },
            other => other.into(),
        }
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        info!("closing database connection pool");
        self.pool.close().await;
    }
}
