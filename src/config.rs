use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::interceptor::Interceptor;

/// Environment variable consulted when a [`Config`] does not pin its run mode.
pub const RUN_MODE_ENV: &str = "SQL_HOOKS_MODE";

/// Whether the process runs in development or production mode.
///
/// Development mode forces verbose statement logging on, whatever
/// [`Config::debug`] says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[serde(alias = "dev")]
    Development,
    #[default]
    #[serde(alias = "prod")]
    Production,
}

impl RunMode {
    /// Parse a run mode name; anything unrecognized is production.
    #[must_use]
    pub fn parse(value: &str) -> RunMode {
        match value.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => RunMode::Development,
            _ => RunMode::Production,
        }
    }

    /// Read the run mode from [`RUN_MODE_ENV`].
    #[must_use]
    pub fn from_env() -> RunMode {
        std::env::var(RUN_MODE_ENV)
            .map(|v| RunMode::parse(&v))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_development(self) -> bool {
        self == RunMode::Development
    }
}

/// True when the environment selects development mode.
#[must_use]
pub fn is_development_mode() -> bool {
    RunMode::from_env().is_development()
}

/// Options for opening a [`Db`](crate::db::Db).
///
/// Durations deserialize from whole seconds or humantime strings (`"500ms"`,
/// `"5m"`). A zero duration means "not set": the pool keeps its own default.
///
/// ```rust
/// use std::time::Duration;
/// use sql_hooks::prelude::*;
///
/// let config = Config::new("app.db")
///     .with_max_open_conns(16)
///     .with_max_idle_conns(4)
///     .with_conn_max_lifetime(Duration::from_secs(600))
///     .with_interceptor(log_interceptor());
/// assert_eq!(config.interceptors().len(), 1);
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Name used to tag log records and spans.
    pub name: String,
    /// Data source name: a file path (or `file:` URI) for `SQLite`, a
    /// key/value string or URL for `PostgreSQL`.
    pub dsn: String,
    /// Verbose statement logging.
    pub debug: bool,
    pub max_idle_conns: u32,
    pub max_open_conns: u32,
    #[serde(with = "duration_serde")]
    pub conn_max_lifetime: Duration,
    #[serde(with = "duration_serde")]
    pub conn_max_idle_time: Duration,
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,
    /// Calls slower than this are flagged by the log interceptor.
    #[serde(with = "duration_serde")]
    pub slow_threshold: Duration,
    /// Include statement parameters in interceptor log records.
    pub detail_sql: bool,
    /// Pins the run mode instead of reading [`RUN_MODE_ENV`].
    pub run_mode: Option<RunMode>,
    #[serde(skip)]
    interceptors: Vec<Interceptor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: String::new(),
            dsn: String::new(),
            debug: false,
            max_idle_conns: 10,
            max_open_conns: 100,
            conn_max_lifetime: Duration::from_secs(300),
            conn_max_idle_time: Duration::ZERO,
            connect_timeout: Duration::ZERO,
            slow_threshold: Duration::from_millis(500),
            detail_sql: false,
            run_mode: None,
            interceptors: Vec::new(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("name", &self.name)
            .field("debug", &self.debug)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("max_open_conns", &self.max_open_conns)
            .field("conn_max_lifetime", &self.conn_max_lifetime)
            .field("conn_max_idle_time", &self.conn_max_idle_time)
            .field("connect_timeout", &self.connect_timeout)
            .field("slow_threshold", &self.slow_threshold)
            .field("detail_sql", &self.detail_sql)
            .field("run_mode", &self.run_mode)
            .field("interceptors", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

impl Config {
    #[must_use]
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_max_idle_conns(mut self, max_idle_conns: u32) -> Self {
        self.max_idle_conns = max_idle_conns;
        self
    }

    #[must_use]
    pub fn with_max_open_conns(mut self, max_open_conns: u32) -> Self {
        self.max_open_conns = max_open_conns;
        self
    }

    #[must_use]
    pub fn with_conn_max_lifetime(mut self, lifetime: Duration) -> Self {
        self.conn_max_lifetime = lifetime;
        self
    }

    #[must_use]
    pub fn with_conn_max_idle_time(mut self, idle_time: Duration) -> Self {
        self.conn_max_idle_time = idle_time;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_detail_sql(mut self, detail_sql: bool) -> Self {
        self.detail_sql = detail_sql;
        self
    }

    #[must_use]
    pub fn with_run_mode(mut self, run_mode: RunMode) -> Self {
        self.run_mode = Some(run_mode);
        self
    }

    /// Append an interceptor; earlier interceptors wrap later ones.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Interceptor) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    #[must_use]
    pub fn with_interceptors(mut self, interceptors: impl IntoIterator<Item = Interceptor>) -> Self {
        self.interceptors.extend(interceptors);
        self
    }

    /// Interceptors in configuration order.
    #[must_use]
    pub fn interceptors(&self) -> &[Interceptor] {
        &self.interceptors
    }

    /// The pinned run mode, or the one read from the environment.
    #[must_use]
    pub fn run_mode(&self) -> RunMode {
        self.run_mode.unwrap_or_else(RunMode::from_env)
    }

    /// Statement logging as the engine will apply it.
    #[must_use]
    pub fn effective_log_mode(&self) -> bool {
        self.debug || self.run_mode().is_development()
    }
}

mod duration_serde {
    use std::time::Duration;

    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        deserializer.deserialize_any(DurationVisitor)
    }

    struct DurationVisitor;

    impl<'de> Visitor<'de> for DurationVisitor {
        type Value = Duration;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("whole seconds or a duration string such as \"500ms\"")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Duration, E> {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Duration, E> {
            u64::try_from(v)
                .map(Duration::from_secs)
                .map_err(|_| E::custom("duration must not be negative"))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Duration, E> {
            let v = v.trim();
            if v == "0" {
                return Ok(Duration::ZERO);
            }
            humantime::parse_duration(v).map_err(E::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::new("app.db");
        assert_eq!(cfg.max_idle_conns, 10);
        assert_eq!(cfg.max_open_conns, 100);
        assert_eq!(cfg.conn_max_lifetime, Duration::from_secs(300));
        assert_eq!(cfg.slow_threshold, Duration::from_millis(500));
        assert!(cfg.interceptors().is_empty());
    }

    #[test]
    fn development_mode_forces_logging() {
        let cfg = Config::new("app.db")
            .with_debug(false)
            .with_run_mode(RunMode::Development);
        assert!(cfg.effective_log_mode());

        let cfg = cfg.with_run_mode(RunMode::Production);
        assert!(!cfg.effective_log_mode());
        assert!(cfg.with_debug(true).effective_log_mode());
    }

    #[test]
    fn run_mode_names() {
        assert_eq!(RunMode::parse("dev"), RunMode::Development);
        assert_eq!(RunMode::parse(" Development"), RunMode::Development);
        assert_eq!(RunMode::parse("staging"), RunMode::Production);
    }

    #[test]
    fn deserializes_durations() -> Result<(), serde_json::Error> {
        let cfg: Config = serde_json::from_str(
            r#"{
                "dsn": "app.db",
                "max_open_conns": 20,
                "conn_max_lifetime": "10m",
                "slow_threshold": "250ms",
                "connect_timeout": 5,
                "run_mode": "dev"
            }"#,
        )?;
        assert_eq!(cfg.max_open_conns, 20);
        assert_eq!(cfg.max_idle_conns, 10);
        assert_eq!(cfg.conn_max_lifetime, Duration::from_secs(600));
        assert_eq!(cfg.slow_threshold, Duration::from_millis(250));
        assert_eq!(cfg.connect_timeout, Duration::from_secs(5));
        assert_eq!(cfg.run_mode, Some(RunMode::Development));
        Ok(())
    }

    #[test]
    fn zero_lifetime_string() -> Result<(), serde_json::Error> {
        let cfg: Config = serde_json::from_str(r#"{"conn_max_lifetime": "0"}"#)?;
        assert_eq!(cfg.conn_max_lifetime, Duration::ZERO);
        Ok(())
    }
}
