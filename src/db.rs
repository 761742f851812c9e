use std::fmt;
use std::sync::Arc;

use crate::callbacks::{Callbacks, Operation, Scope};
use crate::config::Config;
use crate::context::QueryContext;
use crate::dsn::DsnInfo;
use crate::error::SqlHooksError;
use crate::interceptor::install;
use crate::pool::{MiddlewarePool, PoolLimits};
use crate::results::{CustomDbRow, ResultSet};
use crate::types::{DatabaseType, RowValues};

/// Open a pooled handle for `dialect` (`sqlite`, `postgres`, or an alias).
///
/// # Errors
/// See [`Db::open`].
pub async fn open(dialect: &str, config: Config) -> Result<Db, SqlHooksError> {
    Db::open(dialect.parse()?, config).await
}

struct DbInner {
    name: String,
    dsn: Arc<DsnInfo>,
    pool: MiddlewarePool,
    limits: PoolLimits,
    log_mode: bool,
    callbacks: Callbacks,
}

/// A pooled database handle.
///
/// Every statement runs through the engine callback registered for its
/// [`Operation`], wrapped by the interceptors the handle was opened with.
/// Clones share the pool and the callbacks but not the attached
/// [`QueryContext`].
#[derive(Clone)]
pub struct Db {
    inner: Arc<DbInner>,
    context: Option<QueryContext>,
}

impl Db {
    /// Build the pool, resolve the log mode and install the configured
    /// interceptors on the engine callbacks.
    ///
    /// # Errors
    /// - `ConfigError` for an empty DSN, a dialect not compiled in, or an
    ///   interceptor installation failure
    /// - the driver's own error when the first connection fails
    pub async fn open(dialect: DatabaseType, config: Config) -> Result<Db, SqlHooksError> {
        let dsn = Arc::new(DsnInfo::parse(dialect, &config.dsn)?);
        let limits = PoolLimits::from_config(&config);
        let pool = MiddlewarePool::connect(dialect, config.dsn.trim(), &limits).await?;

        let log_mode = config.effective_log_mode();
        if log_mode && !config.debug {
            tracing::info!(
                name = %config.name,
                db = %dsn,
                "development mode: statement logging enabled"
            );
        }

        let mut callbacks = Callbacks::with_defaults();
        install(&mut callbacks, &dsn, &config)?;

        tracing::debug!(
            name = %config.name,
            db = %dsn,
            max_open = limits.max_open,
            max_idle = limits.max_idle,
            interceptors = config.interceptors().len(),
            "database opened"
        );

        Ok(Db {
            inner: Arc::new(DbInner {
                name: config.name,
                dsn,
                pool,
                limits,
                log_mode,
                callbacks,
            }),
            context: None,
        })
    }

    /// Attach `context` to this handle, replacing any attached before.
    pub fn with_context(&mut self, context: QueryContext) -> &mut Self {
        self.context = Some(context);
        self
    }

    /// A clone of this handle carrying `context`.
    #[must_use]
    pub fn scoped(&self, context: QueryContext) -> Db {
        Db {
            inner: Arc::clone(&self.inner),
            context: Some(context),
        }
    }

    #[must_use]
    pub fn context(&self) -> Option<&QueryContext> {
        self.context.as_ref()
    }

    pub fn clear_context(&mut self) -> Option<QueryContext> {
        self.context.take()
    }

    /// Rows inserted.
    ///
    /// # Errors
    /// Returns the error recorded by the callback chain.
    pub async fn create(&self, sql: &str, params: &[RowValues]) -> Result<usize, SqlHooksError> {
        self.dispatch(Operation::Create, sql, params)
            .await
            .map(|rs| rs.rows_affected)
    }

    /// Rows updated.
    ///
    /// # Errors
    /// Returns the error recorded by the callback chain.
    pub async fn update(&self, sql: &str, params: &[RowValues]) -> Result<usize, SqlHooksError> {
        self.dispatch(Operation::Update, sql, params)
            .await
            .map(|rs| rs.rows_affected)
    }

    /// Rows deleted.
    ///
    /// # Errors
    /// Returns the error recorded by the callback chain.
    pub async fn delete(&self, sql: &str, params: &[RowValues]) -> Result<usize, SqlHooksError> {
        self.dispatch(Operation::Delete, sql, params)
            .await
            .map(|rs| rs.rows_affected)
    }

    /// # Errors
    /// Returns the error recorded by the callback chain.
    pub async fn query(&self, sql: &str, params: &[RowValues]) -> Result<ResultSet, SqlHooksError> {
        self.dispatch(Operation::Query, sql, params).await
    }

    /// The first row of a query.
    ///
    /// # Errors
    /// Returns `RecordNotFound` when the query yields no rows.
    pub async fn find_one(&self, sql: &str, params: &[RowValues]) -> Result<CustomDbRow, SqlHooksError> {
        let mut rs = self.dispatch(Operation::Query, sql, params).await?;
        if rs.results.is_empty() {
            return Err(SqlHooksError::RecordNotFound);
        }
        Ok(rs.results.swap_remove(0))
    }

    /// The first row of a row query, if any.
    ///
    /// # Errors
    /// Returns the error recorded by the callback chain.
    pub async fn row(&self, sql: &str, params: &[RowValues]) -> Result<Option<CustomDbRow>, SqlHooksError> {
        let rs = self.dispatch(Operation::RowQuery, sql, params).await?;
        Ok(rs.results.into_iter().next())
    }

    /// # Errors
    /// Returns the error recorded by the callback chain.
    pub async fn rows(&self, sql: &str, params: &[RowValues]) -> Result<ResultSet, SqlHooksError> {
        self.dispatch(Operation::RowQuery, sql, params).await
    }

    /// Run DDL or other setup statements directly on the pool, outside the
    /// callbacks.
    ///
    /// # Errors
    /// Returns the driver error unchanged.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), SqlHooksError> {
        self.inner.pool.execute_batch(sql).await
    }

    async fn dispatch(
        &self,
        operation: Operation,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, SqlHooksError> {
        let scope = Scope::bound(
            operation,
            sql.to_string(),
            params.to_vec(),
            self.context.clone(),
            Arc::clone(&self.inner.dsn),
            self.inner.pool.clone(),
            self.inner.log_mode,
        );
        self.inner
            .callbacks
            .processor(operation)
            .execute(scope)
            .await
            .into_result()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn dialect(&self) -> DatabaseType {
        self.inner.dsn.dialect
    }

    #[must_use]
    pub fn dsn(&self) -> &DsnInfo {
        &self.inner.dsn
    }

    #[must_use]
    pub fn pool_limits(&self) -> PoolLimits {
        self.inner.limits
    }

    /// Whether the engine logs every statement.
    #[must_use]
    pub fn log_mode(&self) -> bool {
        self.inner.log_mode
    }

    #[must_use]
    pub fn callbacks(&self) -> &Callbacks {
        &self.inner.callbacks
    }

    #[must_use]
    pub fn pool_state(&self) -> bb8::State {
        self.inner.pool.state()
    }
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("name", &self.inner.name)
            .field("dsn", &self.inner.dsn)
            .field("limits", &self.inner.limits)
            .field("log_mode", &self.inner.log_mode)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
