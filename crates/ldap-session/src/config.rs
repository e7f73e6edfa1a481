//! Session configuration.

use std::time::Duration;

use ldap_proto::{ConnectionDescriptor, DEFAULT_URI};
use ldap_tls::TlsConfig;

use crate::error::Error;

/// Timeout configuration for connection and operations.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Time to establish the TCP connection (default: 15s).
    pub connect_timeout: Duration,
    /// Client-side bound on each network operation (default: none).
    ///
    /// A search with its own time limit is bounded by that instead.
    pub operation_timeout: Option<Duration>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            operation_timeout: None,
        }
    }
}

impl TimeoutConfig {
    /// Create a new timeout configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TCP connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-operation timeout.
    #[must_use]
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Remove the per-operation timeout.
    #[must_use]
    pub fn no_operation_timeout(mut self) -> Self {
        self.operation_timeout = None;
        self
    }
}

/// Configuration for a directory session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// LDAP URL of the server.
    pub uri: String,
    /// Upgrade plain `ldap://` connections with StartTLS before binding.
    pub start_tls: bool,
    /// TLS settings for StartTLS and `ldaps://`.
    pub tls: TlsConfig,
    /// Timeouts.
    pub timeouts: TimeoutConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            start_tls: false,
            tls: TlsConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server URL.
    #[must_use]
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    /// Request StartTLS on `ldap://` connections.
    #[must_use]
    pub fn start_tls(mut self, enabled: bool) -> Self {
        self.start_tls = enabled;
        self
    }

    /// Set the TLS configuration.
    #[must_use]
    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.tls = tls;
        self
    }

    /// Accept any server certificate.
    ///
    /// **Warning:** only for testing against servers with self-signed
    /// certificates.
    #[must_use]
    pub fn trust_server_certificate(mut self, trust: bool) -> Self {
        self.tls = self.tls.trust_server_certificate(trust);
        self
    }

    /// Set the timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the TCP connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.connect_timeout = timeout;
        self
    }

    /// Set the per-operation timeout.
    #[must_use]
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.operation_timeout = Some(timeout);
        self
    }

    /// Parse the configured URL.
    pub fn descriptor(&self) -> Result<ConnectionDescriptor, Error> {
        Ok(ConnectionDescriptor::parse(&self.uri)?)
    }

    /// Validate the configuration without touching the network.
    pub fn validate(&self) -> Result<(), Error> {
        self.descriptor()?;

        if self.timeouts.connect_timeout.is_zero() {
            return Err(Error::Config("connect timeout must be non-zero".into()));
        }
        if self.timeouts.operation_timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::Config(
                "operation timeout must be non-zero; use no_operation_timeout() to disable".into(),
            ));
        }
        if self.tls.min_protocol_version > self.tls.max_protocol_version {
            return Err(Error::Config(
                "minimum TLS version is above the maximum".into(),
            ));
        }
        Ok(())
    }
}
