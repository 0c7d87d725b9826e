//! prismops-exec: Remote execution fan-out
//!
//! Parses target host lists, runs commands on each host over SSH and
//! aggregates the per-host results into a single report.

pub mod error;
pub mod fanout;
pub mod hosts;
pub mod result;
pub mod ssh;
pub mod traits;

pub use error::{ExecError, FanoutError};
pub use fanout::MultiHostExecutor;
pub use hosts::HostSet;
pub use result::{ConnectionConfig, FanoutReport, HostKeyPolicy};
pub use ssh::{SshConnector, SshSession};
pub use traits::{Connector, RemoteSession};
