use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::amount::{DEFAULT_SCALE, MAX_SCALE};
use crate::error::CoreError;

/// Connection and behaviour settings for a [`BitcoindClient`](crate::BitcoindClient).
#[derive(Clone)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// `user:pass` cookie file written by the daemon. Used only when no
    /// explicit credentials are configured.
    pub cookie_file: Option<PathBuf>,
    pub tls: bool,
    /// PEM bundle trusted in addition to the system roots.
    pub ca_bundle: Option<PathBuf>,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    /// Outbound request cap; `None` disables rate limiting.
    pub requests_per_second: Option<u32>,
    /// Fractional digits for every amount read from or sent to the daemon.
    pub scale: u32,
    /// Gate wallet load/unload/encrypt and the signing RPC on the node's
    /// self-reported capabilities.
    pub validate_core_privileges: bool,
    /// Prefix mixed into every request id.
    pub request_id_nonce: Option<String>,
}

impl RpcConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    pub fn with_tls(mut self, ca_bundle: Option<PathBuf>) -> Self {
        self.tls = true;
        self.ca_bundle = ca_bundle;
        self
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, total: Duration) -> Self {
        self.connect_timeout = connect;
        self.timeout = total;
        self
    }

    pub fn validate_core_privileges(mut self, validate: bool) -> Self {
        self.validate_core_privileges = validate;
        self
    }

    pub(crate) fn check(&self) -> Result<(), CoreError> {
        if self.host.trim().is_empty() {
            return Err(CoreError::Config("rpc host must not be empty".to_owned()));
        }
        if self.scale > MAX_SCALE {
            return Err(CoreError::Config(format!(
                "decimal scale {} exceeds maximum of {MAX_SCALE}",
                self.scale
            )));
        }
        if self.requests_per_second == Some(0) {
            return Err(CoreError::Config(
                "requests_per_second must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8332,
            username: None,
            password: None,
            cookie_file: None,
            tls: false,
            ca_bundle: None,
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            requests_per_second: None,
            scale: DEFAULT_SCALE,
            validate_core_privileges: true,
            request_id_nonce: None,
        }
    }
}

impl fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("cookie_file", &self.cookie_file)
            .field("tls", &self.tls)
            .field("ca_bundle", &self.ca_bundle)
            .field("connect_timeout", &self.connect_timeout)
            .field("timeout", &self.timeout)
            .field("requests_per_second", &self.requests_per_second)
            .field("scale", &self.scale)
            .field("validate_core_privileges", &self.validate_core_privileges)
            .field("request_id_nonce", &self.request_id_nonce)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_daemon_conventions() {
        let config = RpcConfig::default();
        assert_eq!(config.port, 8332);
        assert_eq!(config.scale, 8);
        assert!(config.validate_core_privileges);
        assert!(config.check().is_ok());
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = RpcConfig::new("node", 18443).with_credentials("alice", "hunter2");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn rejects_oversized_scale() {
        let err = RpcConfig::default().with_scale(30).check().expect_err("must reject");
        assert!(err.to_string().contains("decimal scale"));
    }
}
