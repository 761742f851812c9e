//! The engine's named extension points.
//!
//! Every [`Db`](crate::db::Db) operation belongs to one [`Operation`] and is
//! dispatched through that operation's [`CallbackProcessor`]: an ordered list
//! of named [`Handler`]s. The engine registers one handler per operation
//! under [`Operation::callback_name`]; interceptors are installed by
//! replacing that registration with a wrapped version of itself.

mod defaults;
mod processor;
mod scope;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

pub use processor::{CallbackProcessor, Callbacks};
pub use scope::Scope;

/// One step of an operation. Handlers take the scope by value and hand it
/// back, recording the outcome (or error) on it.
pub type Handler = Arc<dyn Fn(Scope) -> BoxFuture<'static, Scope> + Send + Sync>;

/// Wrap an async function or closure as a [`Handler`].
///
/// ```rust
/// use sql_hooks::prelude::*;
///
/// let noop = handler_fn(|scope: Scope| async move { scope });
/// # let _ = noop;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> Handler
where
    F: Fn(Scope) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Scope> + Send + 'static,
{
    Arc::new(move |scope: Scope| -> BoxFuture<'static, Scope> { Box::pin(f(scope)) })
}

/// The operation categories the engine exposes as extension points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Query,
    RowQuery,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Create,
        Operation::Update,
        Operation::Delete,
        Operation::Query,
        Operation::RowQuery,
    ];

    /// Name the engine registers its own handler under.
    #[must_use]
    pub fn callback_name(self) -> &'static str {
        match self {
            Operation::Create => "engine:create",
            Operation::Update => "engine:update",
            Operation::Delete => "engine:delete",
            Operation::Query => "engine:query",
            Operation::RowQuery => "engine:row_query",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Query => "query",
            Operation::RowQuery => "row_query",
        }
    }

    /// True for operations that return rows rather than a change count.
    #[must_use]
    pub fn returns_rows(self) -> bool {
        matches!(self, Operation::Query | Operation::RowQuery)
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Operation::Create => 0,
            Operation::Update => 1,
            Operation::Delete => 2,
            Operation::Query => 3,
            Operation::RowQuery => 4,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
