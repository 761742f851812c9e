//! Pooled database handles whose create, update, delete, query and row-query
//! operations run through named engine callbacks that an ordered chain of
//! interceptors can wrap.
//!
//! ```rust,no_run
//! use sql_hooks::prelude::*;
//!
//! # async fn demo() -> Result<(), SqlHooksError> {
//! let config = Config::new("app.db")
//!     .with_max_open_conns(8)
//!     .with_interceptor(log_interceptor())
//!     .with_interceptor(trace_interceptor());
//! let db = open("sqlite", config).await?;
//! db.execute_batch("CREATE TABLE IF NOT EXISTS t (id INTEGER, name TEXT)").await?;
//! db.create(
//!     "INSERT INTO t (id, name) VALUES (?1, ?2)",
//!     &[RowValues::Int(1), RowValues::Text("alice".into())],
//! )
//! .await?;
//! # Ok(()) }
//! ```

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
compile_error!("enable at least one of the `sqlite` or `postgres` features");

pub mod callbacks;
pub mod config;
pub mod context;
pub mod db;
pub mod dsn;
pub mod error;
pub mod interceptor;
pub mod interceptors;
pub mod pool;
pub mod prelude;
pub mod results;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use callbacks::{CallbackProcessor, Callbacks, Handler, Operation, Scope, handler_fn};
pub use config::{Config, RunMode, is_development_mode};
pub use context::QueryContext;
pub use db::{Db, open};
pub use dsn::DsnInfo;
pub use error::{
    SqlHooksError, is_cant_start_transaction, is_invalid_sql, is_invalid_transaction,
    is_record_not_found, is_unaddressable,
};
pub use interceptor::{Interceptor, Layer, compose, install, interceptor, layer};
pub use interceptors::{SlowCommand, log_interceptor, trace_interceptor};
pub use pool::{MiddlewarePool, PoolLimits};
pub use results::{CustomDbRow, ResultSet};
pub use types::{DatabaseType, RowValues};
