use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bb8::ManageConnection;

use crate::error::SqlHooksError;

/// A pooled `SQLite` connection. rusqlite connections are not `Sync`, so every
/// use goes through the mutex on a blocking thread.
pub type SharedSqliteConnection = Arc<Mutex<rusqlite::Connection>>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// bb8 manager for `SQLite` connections.
#[derive(Debug, Clone)]
pub struct SqliteManager {
    path: String,
}

impl SqliteManager {
    /// `path` is a file path or a `file:` URI.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl ManageConnection for SqliteManager {
    type Connection = SharedSqliteConnection;
    type Error = SqlHooksError;

    #[allow(clippy::manual_async_fn)]
    fn connect(&self) -> impl Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let path = self.path.clone();
        async move {
            tracing::debug!(path = %path, "sqlite connect");
            let conn = tokio::task::spawn_blocking(move || {
                let conn = rusqlite::Connection::open(&path)?;
                conn.busy_timeout(BUSY_TIMEOUT)?;
                Ok::<_, SqlHooksError>(conn)
            })
            .await
            .map_err(|e| {
                SqlHooksError::ConnectionError(format!("sqlite connect task failed: {e}"))
            })??;
            Ok(Arc::new(Mutex::new(conn)))
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn is_valid(
        &self,
        conn: &mut Self::Connection,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send {
        let conn = Arc::clone(conn);
        async move {
            run_blocking(conn, |conn| {
                conn.execute_batch("SELECT 1")
                    .map_err(SqlHooksError::SqliteError)
            })
            .await
        }
    }

    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        conn.is_poisoned()
    }
}

/// Run `func` against the connection on tokio's blocking pool.
///
/// # Errors
/// Returns whatever `func` returns, or `ConnectionError` if the mutex was
/// poisoned by an earlier panic.
pub(crate) async fn run_blocking<F, R>(
    conn: SharedSqliteConnection,
    func: F,
) -> Result<R, SqlHooksError>
where
    F: FnOnce(&mut rusqlite::Connection) -> Result<R, SqlHooksError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.lock().map_err(|_| {
            SqlHooksError::ConnectionError("sqlite connection mutex poisoned".to_string())
        })?;
        func(&mut guard)
    })
    .await
    .map_err(|e| SqlHooksError::ExecutionError(format!("sqlite blocking task failed: {e}")))?
}
