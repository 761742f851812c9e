use std::fmt;
use std::sync::Arc;

use super::Operation;
use crate::context::QueryContext;
use crate::dsn::DsnInfo;
use crate::error::SqlHooksError;
use crate::interceptors::SlowCommand;
use crate::pool::MiddlewarePool;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Per-call state passed down a handler chain and back up again.
///
/// Interceptors may rewrite the statement or parameters before delegating and
/// inspect the result, error or slow-command signal afterwards.
pub struct Scope {
    operation: Operation,
    sql: String,
    params: Vec<RowValues>,
    context: Option<QueryContext>,
    dsn: Option<Arc<DsnInfo>>,
    pool: Option<MiddlewarePool>,
    log_mode: bool,
    result: Option<ResultSet>,
    error: Option<SqlHooksError>,
    slow: Option<SlowCommand>,
}

impl Scope {
    pub(crate) fn bound(
        operation: Operation,
        sql: String,
        params: Vec<RowValues>,
        context: Option<QueryContext>,
        dsn: Arc<DsnInfo>,
        pool: MiddlewarePool,
        log_mode: bool,
    ) -> Self {
        Self {
            operation,
            sql,
            params,
            context,
            dsn: Some(dsn),
            pool: Some(pool),
            log_mode,
            result: None,
            error: None,
            slow: None,
        }
    }

    /// A scope with no pool behind it, for driving handler chains directly.
    /// The engine's own handlers fail on it with `ConnectionError`.
    #[must_use]
    pub fn detached(operation: Operation, sql: impl Into<String>, params: Vec<RowValues>) -> Self {
        Self {
            operation,
            sql: sql.into(),
            params,
            context: None,
            dsn: None,
            pool: None,
            log_mode: false,
            result: None,
            error: None,
            slow: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: QueryContext) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn set_sql(&mut self, sql: impl Into<String>) {
        self.sql = sql.into();
    }

    #[must_use]
    pub fn params(&self) -> &[RowValues] {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Vec<RowValues> {
        &mut self.params
    }

    #[must_use]
    pub fn context(&self) -> Option<&QueryContext> {
        self.context.as_ref()
    }

    #[must_use]
    pub fn dsn(&self) -> Option<&DsnInfo> {
        self.dsn.as_deref()
    }

    #[must_use]
    pub fn log_mode(&self) -> bool {
        self.log_mode
    }

    pub(crate) fn pool(&self) -> Option<&MiddlewarePool> {
        self.pool.as_ref()
    }

    #[must_use]
    pub fn result(&self) -> Option<&ResultSet> {
        self.result.as_ref()
    }

    pub fn set_result(&mut self, result: ResultSet) {
        self.result = Some(result);
    }

    /// Rows returned or changed so far; zero before the engine ran.
    #[must_use]
    pub fn rows_affected(&self) -> usize {
        self.result.as_ref().map_or(0, |rs| rs.rows_affected)
    }

    #[must_use]
    pub fn error(&self) -> Option<&SqlHooksError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Record an error; later handlers in the same processor are skipped.
    pub fn set_error(&mut self, error: SqlHooksError) {
        self.error = Some(error);
    }

    pub fn take_error(&mut self) -> Option<SqlHooksError> {
        self.error.take()
    }

    #[must_use]
    pub fn slow_command(&self) -> Option<&SlowCommand> {
        self.slow.as_ref()
    }

    pub fn set_slow_command(&mut self, slow: SlowCommand) {
        self.slow = Some(slow);
    }

    /// The operation's outcome: the recorded error, else the result (empty if
    /// no handler produced one).
    ///
    /// # Errors
    /// Returns the error recorded on the scope.
    pub fn into_result(self) -> Result<ResultSet, SqlHooksError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result.unwrap_or_default()),
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("operation", &self.operation)
            .field("sql", &self.sql)
            .field("params", &self.params.len())
            .field("context", &self.context)
            .field("dsn", &self.dsn)
            .field("rows_affected", &self.rows_affected())
            .field("error", &self.error)
            .field("slow", &self.slow)
            .finish_non_exhaustive()
    }
}
