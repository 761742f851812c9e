use std::sync::Arc;

use bb8::Pool;

use crate::error::SqlHooksError;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::config::{SqliteManager, run_blocking};
use super::params::Params;
use super::query::build_result_set;

/// Execute a batch of SQL statements using auto-commit.
///
/// # Errors
/// Returns the driver error if any statement fails.
pub async fn execute_batch(pool: &Pool<SqliteManager>, query: &str) -> Result<(), SqlHooksError> {
    let conn = pool.get().await?;
    let query = query.to_owned();
    run_blocking(Arc::clone(&*conn), move |conn| {
        conn.execute_batch(&query).map_err(SqlHooksError::SqliteError)
    })
    .await
}

/// Execute a SELECT and collect its rows.
///
/// # Errors
/// Returns the driver error if preparation, execution or extraction fails.
pub async fn execute_select(
    pool: &Pool<SqliteManager>,
    query: &str,
    params: &[RowValues],
) -> Result<ResultSet, SqlHooksError> {
    let conn = pool.get().await?;
    let query = query.to_owned();
    let params = Params::convert(params);
    run_blocking(Arc::clone(&*conn), move |conn| {
        let mut stmt = conn.prepare_cached(&query)?;
        build_result_set(&mut stmt, params.as_values())
    })
    .await
}

/// Execute a DML statement (INSERT, UPDATE, DELETE) and return rows affected.
///
/// # Errors
/// Returns the driver error if preparation or execution fails.
pub async fn execute_dml(
    pool: &Pool<SqliteManager>,
    query: &str,
    params: &[RowValues],
) -> Result<usize, SqlHooksError> {
    let conn = pool.get().await?;
    let query = query.to_owned();
    let params = Params::convert(params);
    run_blocking(Arc::clone(&*conn), move |conn| {
        let mut stmt = conn.prepare_cached(&query)?;
        let refs = params.as_refs();
        Ok(stmt.execute(&refs[..])?)
    })
    .await
}
