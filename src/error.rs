use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlHooksError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    /// Occurs when a single-row lookup finds nothing. Multi-row queries never
    /// return it.
    #[error("record not found")]
    RecordNotFound,

    /// Occurs when a statement is handed to the engine that it cannot run at all.
    #[error("invalid SQL: {0}")]
    InvalidSql(String),

    /// Occurs when committing or rolling back outside a transaction.
    #[error("no valid transaction")]
    InvalidTransaction,

    /// Occurs when a transaction cannot be started.
    #[error("can't start transaction")]
    CantStartTransaction,

    /// Occurs when a value cannot be written back to its destination.
    #[error("using unaddressable value")]
    Unaddressable,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

impl<E> From<bb8::RunError<E>> for SqlHooksError
where
    E: Into<SqlHooksError>,
{
    fn from(err: bb8::RunError<E>) -> Self {
        match err {
            bb8::RunError::User(inner) => inner.into(),
            bb8::RunError::TimedOut => {
                SqlHooksError::ConnectionError("timed out waiting for a pooled connection".into())
            }
        }
    }
}

/// True for [`SqlHooksError::RecordNotFound`] and for the driver's own
/// "no rows" error.
#[must_use]
pub fn is_record_not_found(err: &SqlHooksError) -> bool {
    match err {
        SqlHooksError::RecordNotFound => true,
        #[cfg(feature = "sqlite")]
        SqlHooksError::SqliteError(rusqlite::Error::QueryReturnedNoRows) => true,
        _ => false,
    }
}

#[must_use]
pub fn is_invalid_sql(err: &SqlHooksError) -> bool {
    matches!(err, SqlHooksError::InvalidSql(_))
}

#[must_use]
pub fn is_invalid_transaction(err: &SqlHooksError) -> bool {
    matches!(err, SqlHooksError::InvalidTransaction)
}

#[must_use]
pub fn is_cant_start_transaction(err: &SqlHooksError) -> bool {
    matches!(err, SqlHooksError::CantStartTransaction)
}

#[must_use]
pub fn is_unaddressable(err: &SqlHooksError) -> bool {
    matches!(err, SqlHooksError::Unaddressable)
}
