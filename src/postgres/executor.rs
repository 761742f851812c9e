use bb8::Pool;

use crate::error::SqlHooksError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::config::PgManager;
use super::params::Params;
use super::query::build_result_set_from_statement;

/// Execute a batch of SQL statements using auto-commit.
///
/// # Errors
/// Returns the driver error if any statement fails.
pub async fn execute_batch(pool: &Pool<PgManager>, query: &str) -> Result<(), SqlHooksError> {
    let client = pool.get().await?;
    client.batch_execute(query).await?;
    Ok(())
}

/// Execute a SELECT and collect its rows.
///
/// # Errors
/// Returns the driver error if preparation, execution or extraction fails.
pub async fn execute_select(
    pool: &Pool<PgManager>,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, SqlHooksError> {
    let client = pool.get().await?;
    let stmt = client.prepare(query).await?;
    let converted = Params::convert(params);
    let rows = client.query(&stmt, converted.as_refs()).await?;
    build_result_set_from_statement(&stmt, &rows)
}

/// Execute a DML statement (INSERT, UPDATE, DELETE) and return rows affected.
///
/// # Errors
/// Returns the driver error if execution fails.
pub async fn execute_dml(
    pool: &Pool<PgManager>,
    query: &str,
    params: &[RowValues],
) -> Result<usize, SqlHooksError> {
    let client = pool.get().await?;
    let converted = Params::convert(params);
    let rows = client.execute(query, converted.as_refs()).await?;
    usize::try_from(rows).map_err(|e| {
        SqlHooksError::ExecutionError(format!("postgres affected rows conversion error: {e}"))
    })
}
