use std::sync::Arc;

use tracing::Instrument;
use tracing::field::{Empty, display};

use crate::callbacks::{Handler, Scope, handler_fn};
use crate::config::Config;
use crate::context::QueryContext;
use crate::dsn::DsnInfo;
use crate::interceptor::{Interceptor, interceptor, layer};

/// Runs the rest of the chain inside an `sql` span tagged with the database,
/// the callback and the attached context's trace id.
#[must_use]
pub fn trace_interceptor() -> Interceptor {
    interceptor(|dsn: &DsnInfo, method: &str, _config: &Config| {
        let dsn = Arc::new(dsn.clone());
        let method: Arc<str> = Arc::from(method);
        layer(move |next: Handler| {
            handler_fn(move |scope: Scope| {
                let next = Arc::clone(&next);
                let span = tracing::info_span!(
                    "sql",
                    db.system = %dsn.dialect,
                    db.addr = %dsn.addr,
                    db.name = %dsn.database,
                    db.method = %method,
                    db.statement = scope.sql(),
                    trace_id = Empty,
                    error = Empty,
                );
                if let Some(trace_id) = scope.context().and_then(QueryContext::trace_id) {
                    span.record("trace_id", trace_id);
                }
                async move {
                    let scope = next(scope).instrument(span.clone()).await;
                    if let Some(err) = scope.error() {
                        span.record("error", display(err));
                    }
                    scope
                }
            })
        })
    })
}
