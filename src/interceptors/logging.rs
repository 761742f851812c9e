use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::callbacks::{Handler, Scope, handler_fn};
use crate::config::Config;
use crate::dsn::DsnInfo;
use crate::error::is_record_not_found;
use crate::interceptor::{Interceptor, interceptor, layer};

/// Signal attached to a [`Scope`] when a call outlives
/// [`Config::slow_threshold`]. The call itself still succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("slow command: took {elapsed:?} (threshold {threshold:?})")]
pub struct SlowCommand {
    pub elapsed: Duration,
    pub threshold: Duration,
}

struct CallSite {
    name: String,
    method: String,
    dsn: DsnInfo,
    slow_threshold: Duration,
    detail_sql: bool,
}

/// Logs each call with its latency, errors at `error` level and calls slower
/// than the configured threshold at `warn` level with a [`SlowCommand`] on
/// the scope. A zero threshold disables slow detection.
#[must_use]
pub fn log_interceptor() -> Interceptor {
    interceptor(|dsn: &DsnInfo, method: &str, config: &Config| {
        let site = Arc::new(CallSite {
            name: config.name.clone(),
            method: method.to_string(),
            dsn: dsn.clone(),
            slow_threshold: config.slow_threshold,
            detail_sql: config.detail_sql,
        });
        layer(move |next: Handler| {
            handler_fn(move |scope: Scope| {
                let next = Arc::clone(&next);
                let site = Arc::clone(&site);
                async move {
                    let started = Instant::now();
                    let mut scope = next(scope).await;
                    let elapsed = started.elapsed();
                    record(&site, &mut scope, elapsed);
                    scope
                }
            })
        })
    })
}

fn record(site: &CallSite, scope: &mut Scope, elapsed: Duration) {
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    let params = if site.detail_sql {
        format!("{:?}", scope.params())
    } else {
        String::new()
    };

    if let Some(err) = scope.error() {
        if is_record_not_found(err) {
            tracing::debug!(
                target: "sql_hooks::access",
                name = %site.name,
                addr = %site.dsn.addr,
                method = %site.method,
                sql = scope.sql(),
                params = %params,
                elapsed_ms,
                "record not found"
            );
        } else {
            tracing::error!(
                target: "sql_hooks::access",
                name = %site.name,
                addr = %site.dsn.addr,
                method = %site.method,
                sql = scope.sql(),
                params = %params,
                elapsed_ms,
                error = %err,
                "sql call failed"
            );
        }
    }

    if !site.slow_threshold.is_zero() && elapsed > site.slow_threshold {
        let slow = SlowCommand {
            elapsed,
            threshold: site.slow_threshold,
        };
        tracing::warn!(
            target: "sql_hooks::access",
            name = %site.name,
            addr = %site.dsn.addr,
            method = %site.method,
            sql = scope.sql(),
            params = %params,
            elapsed_ms,
            "{slow}"
        );
        scope.set_slow_command(slow);
    } else if !scope.has_error() {
        tracing::debug!(
            target: "sql_hooks::access",
            name = %site.name,
            addr = %site.dsn.addr,
            method = %site.method,
            sql = scope.sql(),
            params = %params,
            rows = scope.rows_affected(),
            elapsed_ms,
        );
    }
}
