//! Configuration loading and types
//!
//! Settings come from an optional `prismops.toml` overlaid with environment
//! variables. They are loaded once at startup; SSH and Prism values are
//! validated when a tool first needs them, so the server starts even when
//! only some of the tools are usable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use prismops_exec::{ConnectionConfig, HostKeyPolicy, HostSet};
use prismops_prism::PrismConfig;

pub const ENV_CONFIG: &str = "PRISMOPS_CONFIG";
pub const ENV_SSH_HOST: &str = "SSH_HOST";
pub const ENV_SSH_USERNAME: &str = "SSH_USERNAME";
pub const ENV_SSH_PASSWORD: &str = "SSH_PASSWORD";
pub const ENV_SSH_PORT: &str = "SSH_PORT";
pub const ENV_SSH_LOG_ROOT: &str = "SSH_LOG_ROOT";
pub const ENV_SSH_TIMEOUT: &str = "SSH_TIMEOUT_SECS";
pub const ENV_SSH_INSECURE: &str = "SSH_INSECURE_IGNORE_HOST_KEY";
pub const ENV_OUTPUT_DIR: &str = "PRISMOPS_OUTPUT_DIR";
pub const ENV_NUTANIX_ENDPOINT: &str = "NUTANIX_ENDPOINT";
pub const ENV_NUTANIX_USERNAME: &str = "NUTANIX_USERNAME";
pub const ENV_NUTANIX_PASSWORD: &str = "NUTANIX_PASSWORD";
pub const ENV_NUTANIX_INSECURE: &str = "NUTANIX_INSECURE";
pub const ENV_DEBUG: &str = "DEBUG";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required setting missing or blank
    #[error("{0} is required")]
    Missing(&'static str),

    /// Port outside 1..=65535 or not a number
    #[error("invalid {ENV_SSH_PORT}: {0}")]
    InvalidPort(String),

    /// Timeout not a positive whole number of seconds
    #[error("invalid {ENV_SSH_TIMEOUT}: {0}")]
    InvalidTimeout(String),

    /// Prism Central settings incomplete
    #[error(
        "Prism Central is not configured (set {ENV_NUTANIX_ENDPOINT}, {ENV_NUTANIX_USERNAME}, {ENV_NUTANIX_PASSWORD})"
    )]
    PrismNotConfigured,

    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Remote host access
    #[serde(default)]
    pub ssh: SshSettings,
    /// Prism Central API access
    #[serde(default)]
    pub prism: PrismSettings,
    /// Server and logging settings
    #[serde(default)]
    pub server: ServerSettings,
}

/// SSH fan-out settings
#[derive(Clone, Serialize, Deserialize)]
pub struct SshSettings {
    /// Raw host list; whitespace, `,` or `;` separated
    #[serde(default)]
    pub hosts: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Kept raw so bad values are reported when a tool runs
    #[serde(default, deserialize_with = "string_or_int")]
    pub port: Option<String>,
    /// Connect timeout in seconds; kept raw like `port`
    #[serde(default, deserialize_with = "string_or_int")]
    pub timeout_secs: Option<String>,
    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,
    /// Remote directory that `fetch_service` and the fatal-log scan read
    #[serde(default = "default_log_root")]
    pub log_root: String,
    /// Local directory for fetched files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            hosts: None,
            username: None,
            password: None,
            port: None,
            timeout_secs: None,
            host_key_policy: HostKeyPolicy::default(),
            log_root: default_log_root(),
            output_dir: default_output_dir(),
        }
    }
}

impl std::fmt::Debug for SshSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshSettings")
            .field("hosts", &self.hosts)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("port", &self.port)
            .field("timeout_secs", &self.timeout_secs)
            .field("host_key_policy", &self.host_key_policy)
            .field("log_root", &self.log_root)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

/// Prism Central settings
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct PrismSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Accept self-signed Prism certificates
    #[serde(default)]
    pub insecure: bool,
}

impl std::fmt::Debug for PrismSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrismSettings")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("insecure", &self.insecure)
            .finish()
    }
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Address for the streamable HTTP transport
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            log_level: default_log_level(),
        }
    }
}

fn default_log_root() -> String {
    prismops_logs::commands::DEFAULT_LOG_ROOT.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_bind() -> String {
    "127.0.0.1:8090".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn string_or_int<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Int(n) => n.to_string(),
        Raw::Text(s) => s,
    }))
}

/// Trimmed, non-empty value
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Settings {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load from `$PRISMOPS_CONFIG` or the default paths, or use defaults
    ///
    /// # Errors
    /// Returns error if a config file exists but cannot be read or parsed
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = non_blank(std::env::var(ENV_CONFIG).ok().as_deref()) {
            return Self::load(Path::new(path));
        }

        let paths = [
            PathBuf::from("prismops.toml"),
            PathBuf::from("/etc/prismops/prismops.toml"),
            dirs::config_dir()
                .map(|p| p.join("prismops/prismops.toml"))
                .unwrap_or_default(),
        ];

        for path in paths {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "loading config file");
                return Self::load(&path);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Settings::default())
    }

    /// Overlay environment variables read through `lookup`
    ///
    /// Only non-blank values override; values are trimmed.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get(ENV_SSH_HOST) {
            self.ssh.hosts = Some(v);
        }
        if let Some(v) = get(ENV_SSH_USERNAME) {
            self.ssh.username = Some(v);
        }
        if let Some(v) = get(ENV_SSH_PASSWORD) {
            self.ssh.password = Some(v);
        }
        if let Some(v) = get(ENV_SSH_PORT) {
            self.ssh.port = Some(v);
        }
        if let Some(v) = get(ENV_SSH_TIMEOUT) {
            self.ssh.timeout_secs = Some(v);
        }
        if let Some(v) = get(ENV_SSH_INSECURE) {
            self.ssh.host_key_policy = if parse_flag(&v) {
                HostKeyPolicy::AcceptAny
            } else {
                HostKeyPolicy::KnownHosts
            };
        }
        if let Some(v) = get(ENV_SSH_LOG_ROOT) {
            self.ssh.log_root = v;
        }
        if let Some(v) = get(ENV_OUTPUT_DIR) {
            self.ssh.output_dir = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_NUTANIX_ENDPOINT) {
            self.prism.endpoint = Some(v);
        }
        if let Some(v) = get(ENV_NUTANIX_USERNAME) {
            self.prism.username = Some(v);
        }
        if let Some(v) = get(ENV_NUTANIX_PASSWORD) {
            self.prism.password = Some(v);
        }
        if let Some(v) = get(ENV_NUTANIX_INSECURE) {
            self.prism.insecure = parse_flag(&v);
        }
        if get(ENV_DEBUG).is_some() {
            self.server.log_level = "debug".to_string();
        }
    }
}

impl SshSettings {
    /// Validate and build the connection template and host set
    ///
    /// # Errors
    /// Returns `ConfigError` if hosts, username or password are missing, or
    /// the port or timeout is invalid
    pub fn target(&self) -> Result<(ConnectionConfig, HostSet), ConfigError> {
        let hosts = HostSet::require(self.hosts.as_deref().unwrap_or_default())
            .map_err(|_| ConfigError::Missing(ENV_SSH_HOST))?;
        let username =
            non_blank(self.username.as_deref()).ok_or(ConfigError::Missing(ENV_SSH_USERNAME))?;
        let password =
            non_blank(self.password.as_deref()).ok_or(ConfigError::Missing(ENV_SSH_PASSWORD))?;

        let port = self.port()?;
        let timeout = self.timeout()?;

        let template = ConnectionConfig::new("", username, password)
            .with_port(port)
            .with_timeout(timeout)
            .with_host_key_policy(self.host_key_policy);

        Ok((template, hosts))
    }

    /// Configured connect timeout, default 10 seconds
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidTimeout` unless the value is a positive
    /// whole number of seconds
    pub fn timeout(&self) -> Result<Duration, ConfigError> {
        let Some(raw) = non_blank(self.timeout_secs.as_deref()) else {
            return Ok(prismops_exec::result::DEFAULT_TIMEOUT);
        };
        match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
        }
    }

    /// Configured port, default 22
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidPort` unless the value is in 1..=65535
    pub fn port(&self) -> Result<u16, ConfigError> {
        let Some(raw) = non_blank(self.port.as_deref()) else {
            return Ok(prismops_exec::result::DEFAULT_PORT);
        };
        match raw.parse::<u16>() {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(ConfigError::InvalidPort(raw.to_string())),
        }
    }
}

impl PrismSettings {
    /// Prism client settings, if all of endpoint, username and password are set
    #[must_use]
    pub fn client_config(&self) -> Option<PrismConfig> {
        let endpoint = non_blank(self.endpoint.as_deref())?;
        let username = non_blank(self.username.as_deref())?;
        let password = non_blank(self.password.as_deref())?;
        Some(PrismConfig::new(endpoint, username, password).with_insecure(self.insecure))
    }
}
