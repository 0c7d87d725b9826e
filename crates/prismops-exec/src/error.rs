//! Error types for prismops-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while executing against a single host
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// Failed to connect to remote host
    #[error("SSH dial failed: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Server host key was not accepted by the configured policy
    #[error("host key rejected: {0}")]
    HostKeyRejected(String),

    /// Connect did not complete within the configured timeout
    #[error("connection timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// Command exited with a non-zero (or missing) status
    #[error("command exited with status {status} (output: {output})")]
    CommandFailed {
        /// Exit status code, -1 when the server reported none
        status: i32,
        /// Combined stdout/stderr captured before the failure
        output: String,
    },

    /// Command was terminated by a signal
    #[error("command terminated by signal {signal} (output: {output})")]
    Signaled {
        /// Signal name reported by the server
        signal: String,
        /// Combined stdout/stderr captured before the failure
        output: String,
    },

    /// Channel-level failure while opening or driving a session
    #[error("failed to create session: {0}")]
    Channel(String),

    /// Session was closed or never established
    #[error("not connected")]
    NotConnected,

    /// Output could not be consumed by the caller
    #[error("failed to handle output: {0}")]
    Output(String),

    /// Invalid configuration
    #[error("{0}")]
    Config(String),
}

impl ExecError {
    /// Output captured before a command failure, if any
    #[must_use]
    pub fn partial_output(&self) -> Option<&str> {
        match self {
            ExecError::CommandFailed { output, .. } | ExecError::Signaled { output, .. } => {
                Some(output)
            }
            _ => None,
        }
    }

    /// Whether the error happened before a session was established
    #[must_use]
    pub fn is_connect_error(&self) -> bool {
        matches!(
            self,
            ExecError::ConnectionFailed(_)
                | ExecError::AuthenticationFailed(_)
                | ExecError::HostKeyRejected(_)
                | ExecError::Timeout { .. }
        )
    }
}

/// Errors that fail a whole fan-out operation
#[derive(Error, Debug, Clone)]
pub enum FanoutError {
    /// Settings were missing or invalid; no host was contacted
    #[error("{0}")]
    Config(String),

    /// Every host failed; the report holds each host's error
    #[error("{summary}:\n{report}")]
    AllHostsFailed {
        /// One-line description of the failed operation
        summary: &'static str,
        /// Full per-host report
        report: String,
    },
}

impl From<ExecError> for FanoutError {
    fn from(err: ExecError) -> Self {
        FanoutError::Config(err.to_string())
    }
}
