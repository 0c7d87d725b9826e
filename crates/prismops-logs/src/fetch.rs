//! Remote file fetch naming and local storage

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::commands::shell_quote;
use crate::error::LogsError;

/// File fetched when the caller names none
pub const DEFAULT_FETCH_FILE: &str = "narsil.out";

/// A file to fetch from every host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    /// Absolute path on the remote host
    pub remote_path: String,
    /// Final path component, used for the local file name
    pub base_name: String,
}

impl FetchTarget {
    /// Resolve `requested` under `log_root`
    ///
    /// A missing or blank request fetches [`DEFAULT_FETCH_FILE`]. A leading
    /// `/` is treated as relative to the root.
    ///
    /// # Errors
    /// Returns `LogsError::InvalidPath` if the path contains `..` or names
    /// no file
    pub fn resolve(log_root: &str, requested: Option<&str>) -> Result<Self, LogsError> {
        let requested = requested
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_FETCH_FILE);
        let relative = requested.trim_start_matches('/');

        let path = Path::new(relative);
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(LogsError::InvalidPath(requested.to_string()));
        }

        let base_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| LogsError::InvalidPath(requested.to_string()))?
            .to_string();

        let root = log_root.trim_end_matches('/');
        Ok(Self {
            remote_path: format!("{root}/{relative}"),
            base_name,
        })
    }

    /// Command printing the remote file
    #[must_use]
    pub fn command(&self) -> String {
        format!("cat {}", shell_quote(&self.remote_path))
    }

    /// Write `data` fetched from `host` under `output_dir`
    ///
    /// Returns the local path written. The write is blocking; fan-out
    /// handlers call it between hosts, after that host's session has
    /// finished, so at most one file is written at a time.
    ///
    /// # Errors
    /// Returns `LogsError::Write` if the file cannot be written
    pub fn store(&self, output_dir: &Path, host: &str, data: &[u8]) -> Result<PathBuf, LogsError> {
        let path = output_dir.join(local_file_name(host, &self.base_name));

        std::fs::write(&path, data).map_err(|source| LogsError::Write {
            path: path.display().to_string(),
            source,
        })?;

        debug!(host = %host, path = %path.display(), bytes = data.len(), "stored fetched file");

        Ok(path)
    }
}

/// Make a host identifier safe for a file name
#[must_use]
pub fn sanitize_host(host: &str) -> String {
    host.replace([':', '/'], "_")
}

/// Local file name for `base_name` fetched from `host`
#[must_use]
pub fn local_file_name(host: &str, base_name: &str) -> String {
    format!("{}_{base_name}", sanitize_host(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_default() {
        let target = FetchTarget::resolve("/home/nutanix/data/logs/", None).unwrap();
        assert_eq!(target.remote_path, "/home/nutanix/data/logs/narsil.out");
        assert_eq!(target.base_name, "narsil.out");

        let blank = FetchTarget::resolve("/logs", Some("  ")).unwrap();
        assert_eq!(blank.base_name, "narsil.out");
    }

    #[test]
    fn test_resolve_nested_and_absolute() {
        let target = FetchTarget::resolve("/logs", Some("stargate/stargate.INFO")).unwrap();
        assert_eq!(target.remote_path, "/logs/stargate/stargate.INFO");
        assert_eq!(target.base_name, "stargate.INFO");

        let abs = FetchTarget::resolve("/logs", Some("/genesis.out")).unwrap();
        assert_eq!(abs.remote_path, "/logs/genesis.out");
    }

    #[test]
    fn test_resolve_rejects_parent_dir() {
        let err = FetchTarget::resolve("/logs", Some("../../etc/shadow")).unwrap_err();
        assert!(matches!(err, LogsError::InvalidPath(_)));
    }

    #[test]
    fn test_command_quotes_path() {
        let target = FetchTarget::resolve("/logs", Some("a b.log")).unwrap();
        assert_eq!(target.command(), "cat '/logs/a b.log'");
    }

    #[test]
    fn test_sanitize_host() {
        assert_eq!(sanitize_host("10.0.0.1:22"), "10.0.0.1_22");
        assert_eq!(sanitize_host("fe80::1"), "fe80__1");
        assert_eq!(sanitize_host("a/b"), "a_b");
        assert_eq!(local_file_name("10.0.0.1:22", "narsil.out"), "10.0.0.1_22_narsil.out");
    }

    #[test]
    fn test_store_writes_per_host_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = FetchTarget::resolve("/logs", None).unwrap();

        let path = target.store(dir.path(), "10.0.0.1:22", b"hello").unwrap();

        assert_eq!(path, dir.path().join("10.0.0.1_22_narsil.out"));
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn test_store_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = FetchTarget::resolve("/logs", None).unwrap();

        let err = target
            .store(&dir.path().join("missing"), "h", b"x")
            .unwrap_err();
        assert!(matches!(err, LogsError::Write { .. }));
    }
}
