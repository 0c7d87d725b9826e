//! prismops-logs: Log collection commands
//!
//! Validates tool parameters and builds the shell snippets that scan kernel,
//! crash and service logs on each target host. Also names and writes files
//! fetched from remote hosts.

pub mod commands;
pub mod error;
pub mod fetch;
pub mod lines;

pub use commands::{
    crash_critical_command, critical_logs_command, kernel_critical_command, parse_commands,
    shell_quote,
};
pub use error::LogsError;
pub use fetch::{FetchTarget, local_file_name, sanitize_host};
pub use lines::{DEFAULT_LINES, MAX_LINES, MIN_LINES, lookback, parse_lines};
