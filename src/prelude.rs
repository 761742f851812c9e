//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::callbacks::{CallbackProcessor, Callbacks, Handler, Operation, Scope, handler_fn};
pub use crate::config::{Config, RunMode};
pub use crate::context::QueryContext;
pub use crate::db::{Db, open};
pub use crate::dsn::DsnInfo;
pub use crate::error::{SqlHooksError, is_record_not_found};
pub use crate::interceptor::{Interceptor, Layer, interceptor, layer};
pub use crate::interceptors::{SlowCommand, log_interceptor, trace_interceptor};
pub use crate::pool::PoolLimits;
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::types::{DatabaseType, RowValues};
