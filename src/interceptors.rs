//! Interceptors shipped with the crate.

mod logging;
mod trace;

pub use logging::{SlowCommand, log_interceptor};
pub use trace::trace_interceptor;
