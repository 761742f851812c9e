use std::collections::BTreeMap;

use tokio_util::sync::CancellationToken;

/// Request-scoped metadata that rides along with a [`Db`](crate::db::Db)
/// into every interceptor and engine callback.
///
/// Attach one with [`Db::with_context`](crate::db::Db::with_context). A
/// handle carries at most one context; attaching again replaces it.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    trace_id: Option<String>,
    labels: BTreeMap<String, String>,
    cancel: Option<CancellationToken>,
}

impl QueryContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Operations dispatched after the token fires fail with
    /// [`SqlHooksError::Cancelled`](crate::error::SqlHooksError::Cancelled)
    /// without reaching the driver. A statement already handed to the driver
    /// runs to completion and reports its real outcome.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    #[must_use]
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}
