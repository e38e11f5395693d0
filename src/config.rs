//! Server configuration.
//!
//! [`Config`] is plain data: where to listen and how long and how much to
//! wait for a request line. It can be built in code or loaded from JSON;
//! missing fields fall back to their defaults.
//!
//! ```json
//! { "addr": "0.0.0.0:9000", "max_request_line": 4096, "read_timeout_ms": 5000 }
//! ```

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "127.0.0.1:9000";

/// Default cap on the request line, terminator included (8 KiB).
pub const DEFAULT_MAX_REQUEST_LINE: usize = 8 * 1024;

/// Default time a client gets to send its request line.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("listen address is empty")]
    EmptyAddress,

    #[error("max_request_line must be greater than zero")]
    ZeroLineLimit,

    #[error("read_timeout_ms must be greater than zero")]
    ZeroTimeout,
}

/// Settings fixed for the lifetime of a [`Server`](crate::Server).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Address to bind, e.g. `"127.0.0.1:9000"`.
    pub addr: String,
    /// Maximum bytes accepted for the request line, terminator included.
    pub max_request_line: usize,
    /// Milliseconds a client has to deliver its request line.
    pub read_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_owned(),
            max_request_line: DEFAULT_MAX_REQUEST_LINE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
        }
    }
}

impl Config {
    /// Default settings listening on `addr`.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_request_line(mut self, max_bytes: usize) -> Self {
        self.max_request_line = max_bytes;
        self
    }

    /// Sets the request-line timeout, stored at millisecond precision.
    ///
    /// A non-zero timeout under a millisecond rounds up to one millisecond;
    /// anything past `u64::MAX` milliseconds saturates.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.read_timeout_ms = if ms == 0 && !timeout.is_zero() { 1 } else { ms };
        self
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Parses and validates a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the limits. Whether `addr` can actually be bound is only
    /// known at bind time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addr.trim().is_empty() {
            return Err(ConfigError::EmptyAddress);
        }
        if self.max_request_line == 0 {
            return Err(ConfigError::ZeroLineLimit);
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.addr, "127.0.0.1:9000");
        assert_eq!(cfg.max_request_line, 8192);
        assert_eq!(cfg.read_timeout(), Duration::from_secs(10));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_setters() {
        let cfg = Config::new("0.0.0.0:7000")
            .with_max_request_line(128)
            .with_read_timeout(Duration::from_millis(250));
        assert_eq!(cfg.addr, "0.0.0.0:7000");
        assert_eq!(cfg.max_request_line, 128);
        assert_eq!(cfg.read_timeout_ms, 250);
    }

    #[test]
    fn sub_millisecond_timeout_rounds_up() {
        let cfg = Config::default().with_read_timeout(Duration::from_micros(300));
        assert_eq!(cfg.read_timeout_ms, 1);
        assert_eq!(cfg.read_timeout(), Duration::from_millis(1));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn huge_timeout_saturates() {
        let cfg = Config::default().with_read_timeout(Duration::MAX);
        assert_eq!(cfg.read_timeout_ms, u64::MAX);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn json_partial_uses_defaults() {
        let cfg = Config::from_json(r#"{ "addr": "127.0.0.1:8088" }"#).unwrap();
        assert_eq!(cfg.addr, "127.0.0.1:8088");
        assert_eq!(cfg.max_request_line, DEFAULT_MAX_REQUEST_LINE);
        assert_eq!(cfg.read_timeout(), DEFAULT_READ_TIMEOUT);
    }

    #[test]
    fn json_full() {
        let cfg = Config::from_json(
            r#"{ "addr": "[::1]:9001", "max_request_line": 512, "read_timeout_ms": 1500 }"#,
        )
        .unwrap();
        assert_eq!(cfg.addr, "[::1]:9001");
        assert_eq!(cfg.max_request_line, 512);
        assert_eq!(cfg.read_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn json_empty_object_is_default() {
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }

    #[test]
    fn json_unknown_field_rejected() {
        assert!(matches!(
            Config::from_json(r#"{ "keep_alive": true }"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn empty_address_rejected() {
        assert!(matches!(
            Config::from_json(r#"{ "addr": "  " }"#),
            Err(ConfigError::EmptyAddress)
        ));
        assert!(Config::from_json(r#"{ "addr": "localhost:9000" }"#).is_ok());
    }

    #[test]
    fn zero_limits_rejected() {
        assert!(matches!(
            Config::default().with_max_request_line(0).validate(),
            Err(ConfigError::ZeroLineLimit)
        ));
        assert!(matches!(
            Config::default().with_read_timeout(Duration::ZERO).validate(),
            Err(ConfigError::ZeroTimeout)
        ));
    }
}
