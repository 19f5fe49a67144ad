//! Connection configuration types.

use std::time::Duration;

/// Port on which servers expect TLS from the first byte.
pub const IMPLICIT_TLS_PORT: u16 = 993;

/// Connection security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// No encryption. Used for every port other than 993.
    None,
    /// TLS from the start (port 993).
    #[default]
    Implicit,
}

impl Security {
    /// Picks the security mode from the port: 993 means implicit TLS,
    /// anything else stays plaintext.
    #[must_use]
    pub const fn for_port(port: u16) -> Self {
        if port == IMPLICIT_TLS_PORT {
            Self::Implicit
        } else {
            Self::None
        }
    }
}

/// IMAP connection configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server hostname. Also used for certificate validation.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Bound on TCP connect plus TLS handshake.
    pub connect_timeout: Duration,
    /// Bound on each command exchange, greeting included.
    pub io_timeout: Duration,
}

impl Config {
    /// Creates a configuration whose security mode follows the port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::builder(host).port(port).build()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(host)
    }
}

/// Builder for connection configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    host: String,
    port: u16,
    security: Option<Security>,
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl ConfigBuilder {
    /// Creates a new builder with the given hostname.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: IMPLICIT_TLS_PORT,
            security: None,
            connect_timeout: Duration::from_secs(30),
            io_timeout: Duration::from_secs(60),
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Overrides the security mode derived from the port.
    #[must_use]
    pub const fn security(mut self, security: Security) -> Self {
        self.security = Some(security);
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the I/O timeout.
    #[must_use]
    pub const fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        Config {
            host: self.host,
            port: self.port,
            security: self
                .security
                .unwrap_or_else(|| Security::for_port(self.port)),
            connect_timeout: self.connect_timeout,
            io_timeout: self.io_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_follows_port() {
        assert_eq!(Security::for_port(993), Security::Implicit);
        assert_eq!(Security::for_port(143), Security::None);
        assert_eq!(Security::for_port(1143), Security::None);
    }

    #[test]
    fn test_config_new() {
        let config = Config::new("imap.example.com", 993);
        assert_eq!(config.host, "imap.example.com");
        assert_eq!(config.port, 993);
        assert_eq!(config.security, Security::Implicit);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.io_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder("localhost")
            .port(1143)
            .connect_timeout(Duration::from_secs(5))
            .io_timeout(Duration::from_secs(10))
            .build();

        assert_eq!(config.port, 1143);
        assert_eq!(config.security, Security::None);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.io_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_explicit_security_wins() {
        let config = Config::builder("localhost")
            .port(10993)
            .security(Security::Implicit)
            .build();
        assert_eq!(config.security, Security::Implicit);
    }
}
