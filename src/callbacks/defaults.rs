use std::time::{Duration, Instant};

use super::{Handler, Scope, handler_fn};
use crate::context::QueryContext;
use crate::error::SqlHooksError;
use crate::results::ResultSet;

/// The engine's own handler. Query operations collect rows; the others
/// report rows changed.
pub(super) fn engine_handler() -> Handler {
    handler_fn(run_statement)
}

async fn run_statement(mut scope: Scope) -> Scope {
    let started = Instant::now();
    let outcome = execute(&scope).await;
    if scope.log_mode() {
        log_statement(&scope, &outcome, started.elapsed());
    }
    match outcome {
        Ok(result) => scope.set_result(result),
        Err(err) => scope.set_error(err),
    }
    scope
}

async fn execute(scope: &Scope) -> Result<ResultSet, SqlHooksError> {
    if scope.sql().trim().is_empty() {
        return Err(SqlHooksError::InvalidSql("empty statement".to_string()));
    }
    let pool = scope.pool().ok_or_else(|| {
        SqlHooksError::ConnectionError("scope is not bound to a connection pool".to_string())
    })?;

    // Cancellation is honored only before dispatch; a statement handed to
    // the driver runs to completion.
    if scope.context().is_some_and(QueryContext::is_cancelled) {
        return Err(SqlHooksError::Cancelled);
    }

    if scope.operation().returns_rows() {
        pool.execute_select(scope.sql(), scope.params()).await
    } else {
        pool.execute_dml(scope.sql(), scope.params())
            .await
            .map(ResultSet::from_rows_affected)
    }
}

fn log_statement(scope: &Scope, outcome: &Result<ResultSet, SqlHooksError>, elapsed: Duration) {
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    match outcome {
        Ok(result) => tracing::info!(
            target: "sql_hooks::sql",
            operation = %scope.operation(),
            sql = scope.sql(),
            rows = result.rows_affected,
            elapsed_ms,
        ),
        Err(err) => tracing::info!(
            target: "sql_hooks::sql",
            operation = %scope.operation(),
            sql = scope.sql(),
            error = %err,
            elapsed_ms,
        ),
    }
}
