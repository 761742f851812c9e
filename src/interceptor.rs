//! Interceptor chains over the engine's extension points.
//!
//! An [`Interceptor`] is a factory: given the connection metadata, the
//! callback name it is being installed on and the configuration, it returns
//! a [`Layer`] that wraps the next handler in the chain. [`install`] folds the
//! configured interceptors over each of the five engine callbacks so the
//! first configured interceptor runs first on the way in and last on the way
//! out.

use std::sync::Arc;

use crate::callbacks::{Callbacks, Handler, Operation};
use crate::config::Config;
use crate::dsn::DsnInfo;
use crate::error::SqlHooksError;

/// Wraps the next handler of a chain.
pub type Layer = Box<dyn FnOnce(Handler) -> Handler + Send>;

/// Builds a [`Layer`] for one callback from (connection metadata, callback
/// name, configuration).
pub type Interceptor = Arc<dyn Fn(&DsnInfo, &str, &Config) -> Layer + Send + Sync>;

/// Box a factory closure as an [`Interceptor`].
pub fn interceptor<F>(factory: F) -> Interceptor
where
    F: Fn(&DsnInfo, &str, &Config) -> Layer + Send + Sync + 'static,
{
    Arc::new(factory)
}

/// Box a wrapping closure as a [`Layer`].
pub fn layer<F>(wrap: F) -> Layer
where
    F: FnOnce(Handler) -> Handler + Send + 'static,
{
    Box::new(wrap)
}

/// Fold `config.interceptors()` over `handler`, last interceptor innermost.
///
/// With no interceptors the handler comes back untouched.
#[must_use]
pub fn compose(handler: Handler, dsn: &DsnInfo, callback_name: &str, config: &Config) -> Handler {
    config
        .interceptors()
        .iter()
        .rev()
        .fold(handler, |next, interceptor| {
            interceptor(dsn, callback_name, config)(next)
        })
}

/// Replace each engine callback with its intercepted version.
///
/// Every extension point is checked before anything is replaced, so a
/// registry missing one is left untouched.
///
/// # Errors
/// Returns `ConfigError` naming the first engine callback that is not
/// registered.
pub fn install(callbacks: &mut Callbacks, dsn: &DsnInfo, config: &Config) -> Result<(), SqlHooksError> {
    const ORDER: [Operation; 5] = [
        Operation::Delete,
        Operation::Update,
        Operation::Create,
        Operation::Query,
        Operation::RowQuery,
    ];

    let mut originals = Vec::with_capacity(ORDER.len());
    for op in ORDER {
        let name = op.callback_name();
        let handler = callbacks.processor(op).get(name).ok_or_else(|| {
            SqlHooksError::ConfigError(format!(
                "engine callback {name:?} is not registered; cannot install interceptors"
            ))
        })?;
        originals.push((op, handler));
    }

    if config.interceptors().is_empty() {
        return Ok(());
    }

    for (op, original) in originals {
        let name = op.callback_name();
        let wrapped = compose(original, dsn, name, config);
        callbacks.processor_mut(op).replace(name, wrapped)?;
        tracing::debug!(
            callback = name,
            interceptors = config.interceptors().len(),
            "interceptors installed"
        );
    }
    Ok(())
}
