//! Connection settings and fan-out result types

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default SSH port
pub const DEFAULT_PORT: u16 = 22;

/// Default connect timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How the client treats the server's host key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKeyPolicy {
    /// Accept only keys recorded in the user's `known_hosts`
    #[default]
    KnownHosts,
    /// Accept any key (like `StrictHostKeyChecking=no`); the configured
    /// host list is trusted as-is
    AcceptAny,
}

impl fmt::Display for HostKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostKeyPolicy::KnownHosts => f.write_str("known_hosts"),
            HostKeyPolicy::AcceptAny => f.write_str("accept_any"),
        }
    }
}

/// Connection information for one SSH target
///
/// Built once per invocation as a template, then cloned per host with
/// [`ConnectionConfig::for_host`].
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Host address (may carry its own `:port`)
    pub host: String,
    /// Port used when the host has none
    pub port: u16,
    /// Username
    pub username: String,
    /// Password for password authentication
    pub password: String,
    /// Connect timeout
    pub timeout: Duration,
    /// Host key verification policy
    pub host_key_policy: HostKeyPolicy,
}

impl ConnectionConfig {
    /// Create new connection config with default port, timeout and policy
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            username: username.into(),
            password: password.into(),
            timeout: DEFAULT_TIMEOUT,
            host_key_policy: HostKeyPolicy::default(),
        }
    }

    /// Set custom port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set connect timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set host key policy
    #[must_use]
    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    /// Copy of this config targeting `host`
    #[must_use]
    pub fn for_host(&self, host: &str) -> Self {
        Self {
            host: host.to_string(),
            ..self.clone()
        }
    }

    /// Resolve the address to dial
    ///
    /// A host entry written as `name:port` or `[v6]:port` keeps its own
    /// port; a bare IPv6 literal or name uses the configured port.
    #[must_use]
    pub fn endpoint(&self) -> (String, u16) {
        let host = self.host.as_str();

        if let Some(rest) = host.strip_prefix('[')
            && let Some((addr, tail)) = rest.split_once(']')
        {
            let port = tail
                .strip_prefix(':')
                .and_then(|p| p.parse().ok())
                .unwrap_or(self.port);
            return (addr.to_string(), port);
        }

        // More than one colon without brackets is a bare IPv6 literal
        if host.matches(':').count() == 1
            && let Some((name, port)) = host.rsplit_once(':')
            && let Ok(port) = port.parse()
        {
            return (name.to_string(), port);
        }

        (host.to_string(), self.port)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("host_key_policy", &self.host_key_policy)
            .finish()
    }
}

/// Aggregated result of a fan-out run
#[derive(Debug, Clone, Default)]
pub struct FanoutReport {
    /// Per-host sections in host order
    pub text: String,
    /// Hosts that completed successfully
    pub succeeded: usize,
    /// Hosts that failed
    pub failed: usize,
}

impl FanoutReport {
    /// Total hosts visited
    #[must_use]
    pub fn hosts(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Whether at least one host succeeded
    #[must_use]
    pub fn any_succeeded(&self) -> bool {
        self.succeeded > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ConnectionConfig::new("host", "admin", "secret");
        assert_eq!(cfg.port, 22);
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.host_key_policy, HostKeyPolicy::KnownHosts);
    }

    #[test]
    fn test_for_host_only_changes_host() {
        let base = ConnectionConfig::new("a", "admin", "secret")
            .with_port(2222)
            .with_host_key_policy(HostKeyPolicy::AcceptAny);
        let cfg = base.for_host("b");

        assert_eq!(cfg.host, "b");
        assert_eq!(cfg.port, 2222);
        assert_eq!(cfg.username, "admin");
        assert_eq!(cfg.host_key_policy, HostKeyPolicy::AcceptAny);
        assert_eq!(base.host, "a");
    }

    #[test]
    fn test_endpoint() {
        let cfg = ConnectionConfig::new("", "u", "p").with_port(2200);

        assert_eq!(cfg.for_host("node1").endpoint(), ("node1".to_string(), 2200));
        assert_eq!(
            cfg.for_host("10.0.0.1:22").endpoint(),
            ("10.0.0.1".to_string(), 22)
        );
        assert_eq!(cfg.for_host("fe80::1").endpoint(), ("fe80::1".to_string(), 2200));
        assert_eq!(
            cfg.for_host("[fe80::1]:2022").endpoint(),
            ("fe80::1".to_string(), 2022)
        );
    }

    #[test]
    fn test_debug_redacts_password() {
        let cfg = ConnectionConfig::new("host", "admin", "hunter2");
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
