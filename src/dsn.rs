use std::fmt;

use crate::error::SqlHooksError;
use crate::types::DatabaseType;

/// Connection metadata handed to interceptor factories.
///
/// Parsed once from the data source name at open time. Never carries the
/// password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsnInfo {
    pub dialect: DatabaseType,
    /// `host:port` for network databases, the file path for `SQLite`.
    pub addr: String,
    pub database: String,
    pub user: Option<String>,
}

impl DsnInfo {
    /// Parse the parts of `dsn` that are safe to log.
    ///
    /// # Errors
    /// Returns `ConfigError` for an empty DSN; a `PostgreSQL` DSN the driver
    /// rejects surfaces the driver's own error.
    pub fn parse(dialect: DatabaseType, dsn: &str) -> Result<Self, SqlHooksError> {
        let dsn = dsn.trim();
        if dsn.is_empty() {
            return Err(SqlHooksError::ConfigError("dsn is required".to_string()));
        }
        match dialect {
            DatabaseType::Sqlite => Ok(Self::parse_sqlite(dsn)),
            DatabaseType::Postgres => Self::parse_postgres(dsn),
        }
    }

    fn parse_sqlite(dsn: &str) -> Self {
        let path = dsn.strip_prefix("file:").unwrap_or(dsn);
        let path = path.split('?').next().unwrap_or(path);
        Self {
            dialect: DatabaseType::Sqlite,
            addr: path.to_string(),
            database: "main".to_string(),
            user: None,
        }
    }

    #[cfg(feature = "postgres")]
    fn parse_postgres(dsn: &str) -> Result<Self, SqlHooksError> {
        use tokio_postgres::config::Host;

        let cfg: tokio_postgres::Config = dsn.parse()?;
        let host = match cfg.get_hosts().first() {
            Some(Host::Tcp(host)) => host.clone(),
            #[cfg(unix)]
            Some(Host::Unix(path)) => path.display().to_string(),
            None => "localhost".to_string(),
        };
        let port = cfg.get_ports().first().copied().unwrap_or(5432);
        let user = cfg.get_user().map(str::to_string);
        let database = cfg
            .get_dbname()
            .map(str::to_string)
            .or_else(|| user.clone())
            .unwrap_or_default();
        Ok(Self {
            dialect: DatabaseType::Postgres,
            addr: format!("{host}:{port}"),
            database,
            user,
        })
    }

    #[cfg(not(feature = "postgres"))]
    fn parse_postgres(_dsn: &str) -> Result<Self, SqlHooksError> {
        Err(SqlHooksError::ConfigError(
            "postgres support is not enabled in this build".to_string(),
        ))
    }
}

impl fmt::Display for DsnInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.dialect, self.addr, self.database)
    }
}
