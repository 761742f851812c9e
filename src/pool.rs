use std::fmt;
use std::time::Duration;

use bb8::{Builder, ManageConnection, Pool};

use crate::config::Config;
use crate::error::SqlHooksError;
use crate::types::DatabaseType;

#[cfg(feature = "postgres")]
use crate::postgres::PgManager;
#[cfg(feature = "sqlite")]
use crate::sqlite::SqliteManager;

/// Pool size used when `max_open_conns` is zero (bb8's own default).
pub const DEFAULT_MAX_OPEN: u32 = 10;

/// Pool limits as handed to the underlying bb8 pool. Fixed once the pool is
/// built.
///
/// bb8 is never given a `min_idle`, so opening creates no connections ahead
/// of use and nothing refills idle slots in the background. Idle connections
/// are reaped after `max_idle_time` (bb8's own idle timeout when unset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    /// Upper bound on open connections (bb8 `max_size`).
    pub max_open: u32,
    /// Idle ceiling as configured, clamped to `max_open`. bb8 has no idle
    /// maximum, so this is reported but not passed on.
    pub max_idle: u32,
    /// bb8 `max_lifetime`; `None` leaves the pool's default untouched.
    pub max_lifetime: Option<Duration>,
    /// bb8 `idle_timeout`; `None` leaves the pool's default untouched.
    pub max_idle_time: Option<Duration>,
    /// bb8 `connection_timeout`; `None` leaves the pool's default untouched.
    pub connect_timeout: Option<Duration>,
}

impl PoolLimits {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let max_open = if config.max_open_conns == 0 {
            DEFAULT_MAX_OPEN
        } else {
            config.max_open_conns
        };
        Self {
            max_open,
            max_idle: config.max_idle_conns.min(max_open),
            max_lifetime: positive(config.conn_max_lifetime),
            max_idle_time: positive(config.conn_max_idle_time),
            connect_timeout: positive(config.connect_timeout),
        }
    }

    /// Apply the limits to a bb8 builder. Unset values keep bb8's defaults.
    #[must_use]
    pub fn apply<M: ManageConnection>(&self, builder: Builder<M>) -> Builder<M> {
        let mut builder = builder.max_size(self.max_open).min_idle(None);
        if let Some(lifetime) = self.max_lifetime {
            builder = builder.max_lifetime(Some(lifetime));
        }
        if let Some(idle) = self.max_idle_time {
            builder = builder.idle_timeout(Some(idle));
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connection_timeout(timeout);
        }
        builder
    }
}

fn positive(duration: Duration) -> Option<Duration> {
    (!duration.is_zero()).then_some(duration)
}

/// Connection pool for database access, one variant per dialect.
#[derive(Clone)]
pub enum MiddlewarePool {
    /// `PostgreSQL` connection pool
    #[cfg(feature = "postgres")]
    Postgres(Pool<PgManager>),
    /// `SQLite` connection pool
    #[cfg(feature = "sqlite")]
    Sqlite(Pool<SqliteManager>),
}

impl fmt::Debug for MiddlewarePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("MiddlewarePool")
            .field("dialect", &self.dialect())
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl MiddlewarePool {
    /// Connect once outside the pool so a bad DSN, unreachable host or auth
    /// failure surfaces as the driver's own error, then build the pool.
    ///
    /// # Errors
    /// Returns the driver error from the first connection, or
    /// `ConfigError` if the dialect is not compiled in.
    pub async fn connect(
        dialect: DatabaseType,
        dsn: &str,
        limits: &PoolLimits,
    ) -> Result<Self, SqlHooksError> {
        match dialect {
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => {
                let manager = SqliteManager::new(dsn);
                drop(manager.connect().await?);
                let pool = limits.apply(Pool::builder()).build(manager).await?;
                Ok(MiddlewarePool::Sqlite(pool))
            }
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => {
                let manager = PgManager::from_dsn(dsn)?;
                drop(manager.connect().await?);
                let pool = limits.apply(Pool::builder()).build(manager).await?;
                Ok(MiddlewarePool::Postgres(pool))
            }
            #[allow(unreachable_patterns)]
            other => Err(SqlHooksError::ConfigError(format!(
                "{other} support is not enabled in this build"
            ))),
        }
    }

    #[must_use]
    pub fn dialect(&self) -> DatabaseType {
        match self {
            #[cfg(feature = "postgres")]
            MiddlewarePool::Postgres(_) => DatabaseType::Postgres,
            #[cfg(feature = "sqlite")]
            MiddlewarePool::Sqlite(_) => DatabaseType::Sqlite,
        }
    }

    /// Live connection counts from bb8.
    #[must_use]
    pub fn state(&self) -> bb8::State {
        match self {
            #[cfg(feature = "postgres")]
            MiddlewarePool::Postgres(pool) => pool.state(),
            #[cfg(feature = "sqlite")]
            MiddlewarePool::Sqlite(pool) => pool.state(),
        }
    }

    /// Execute statements that bypass the engine callbacks (schema setup).
    ///
    /// # Errors
    /// Returns the driver error unchanged.
    pub async fn execute_batch(&self, query: &str) -> Result<(), SqlHooksError> {
        match self {
            #[cfg(feature = "postgres")]
            MiddlewarePool::Postgres(pool) => crate::postgres::execute_batch(pool, query).await,
            #[cfg(feature = "sqlite")]
            MiddlewarePool::Sqlite(pool) => crate::sqlite::execute_batch(pool, query).await,
        }
    }

    pub(crate) async fn execute_select(
        &self,
        query: &str,
        params: &[crate::types::RowValues],
    ) -> Result<crate::results::ResultSet, SqlHooksError> {
        match self {
            #[cfg(feature = "postgres")]
            MiddlewarePool::Postgres(pool) => {
                crate::postgres::execute_select(pool, query, params).await
            }
            #[cfg(feature = "sqlite")]
            MiddlewarePool::Sqlite(pool) => crate::sqlite::execute_select(pool, query, params).await,
        }
    }

    pub(crate) async fn execute_dml(
        &self,
        query: &str,
        params: &[crate::types::RowValues],
    ) -> Result<usize, SqlHooksError> {
        match self {
            #[cfg(feature = "postgres")]
            MiddlewarePool::Postgres(pool) => crate::postgres::execute_dml(pool, query, params).await,
            #[cfg(feature = "sqlite")]
            MiddlewarePool::Sqlite(pool) => crate::sqlite::execute_dml(pool, query, params).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_follow_config() {
        let cfg = Config::new("app.db")
            .with_max_open_conns(12)
            .with_max_idle_conns(3)
            .with_conn_max_lifetime(Duration::from_secs(90));
        let limits = PoolLimits::from_config(&cfg);
        assert_eq!(limits.max_open, 12);
        assert_eq!(limits.max_idle, 3);
        assert_eq!(limits.max_lifetime, Some(Duration::from_secs(90)));
        assert_eq!(limits.max_idle_time, None);
    }

    #[test]
    fn zero_lifetime_keeps_pool_default() {
        let cfg = Config::new("app.db").with_conn_max_lifetime(Duration::ZERO);
        assert_eq!(PoolLimits::from_config(&cfg).max_lifetime, None);
    }

    #[test]
    fn idle_is_clamped_to_open() {
        let cfg = Config::new("app.db")
            .with_max_open_conns(2)
            .with_max_idle_conns(8);
        assert_eq!(PoolLimits::from_config(&cfg).max_idle, 2);

        let cfg = Config::new("app.db").with_max_open_conns(0);
        let limits = PoolLimits::from_config(&cfg);
        assert_eq!(limits.max_open, DEFAULT_MAX_OPEN);
        assert_eq!(limits.max_idle, DEFAULT_MAX_OPEN);
    }
}
