//! Multi-host command fan-out
//!
//! Hosts are visited one at a time in host-list order. Each host gets its
//! own session, closed before the next host is dialed. A host's failure is
//! written into the report and never stops the remaining hosts; the whole
//! run fails only when no host succeeded.

use std::fmt::Write as _;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::error::{ExecError, FanoutError};
use crate::hosts::HostSet;
use crate::result::{ConnectionConfig, FanoutReport};
use crate::traits::{Connector, RemoteSession};

const SINGLE_FAILED: &str = "command failed on all SSH hosts";
const BATCH_FAILED: &str = "failed to execute commands on all SSH hosts";

/// Runs commands across every host of a [`HostSet`]
#[derive(Debug)]
pub struct MultiHostExecutor<C> {
    connector: C,
    template: ConnectionConfig,
    hosts: HostSet,
}

impl<C: Connector> MultiHostExecutor<C> {
    /// Create an executor over `hosts`
    ///
    /// `template` supplies every connection setting except the host.
    ///
    /// # Errors
    /// Returns `FanoutError::Config` if `hosts` is empty
    pub fn new(
        connector: C,
        template: ConnectionConfig,
        hosts: HostSet,
    ) -> Result<Self, FanoutError> {
        if hosts.is_empty() {
            return Err(FanoutError::Config("no target host specified".to_string()));
        }
        Ok(Self {
            connector,
            template,
            hosts,
        })
    }

    /// Target hosts in visiting order
    pub fn hosts(&self) -> &HostSet {
        &self.hosts
    }

    /// Run `command` once on every host
    ///
    /// # Errors
    /// Returns `FanoutError::AllHostsFailed` with the full report if no host
    /// succeeded
    pub async fn run_on_all(&self, command: &str) -> Result<FanoutReport, FanoutError> {
        self.run_on_all_with(command, |_, output| {
            Ok(String::from_utf8_lossy(&output).into_owned())
        })
        .await
    }

    /// Run `command` on every host, passing each host's output to `handler`
    ///
    /// The text returned by `handler` goes into the report in place of the
    /// raw output. A handler error counts as that host's failure.
    ///
    /// # Errors
    /// Returns `FanoutError::AllHostsFailed` with the full report if no host
    /// succeeded
    #[instrument(skip(self, command, handler), fields(hosts = self.hosts.len(), transport = self.connector.transport()))]
    pub async fn run_on_all_with<F>(
        &self,
        command: &str,
        mut handler: F,
    ) -> Result<FanoutReport, FanoutError>
    where
        F: FnMut(&str, Vec<u8>) -> Result<String, ExecError> + Send,
    {
        let start = Instant::now();
        let mut report = FanoutReport::default();

        for (index, host) in self.hosts.iter().enumerate() {
            push_header(&mut report.text, index, host);

            let result = match self.run_once(host, command).await {
                Ok(output) => handler(host, output),
                Err(e) => Err(e),
            };

            match result {
                Ok(text) => {
                    report.succeeded += 1;
                    push_output(&mut report.text, &text);
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(host = %host, error = %e, "host failed");
                    let _ = writeln!(report.text, "error: {e}");
                }
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            duration = ?start.elapsed(),
            "fan-out completed"
        );

        finish(report, SINGLE_FAILED)
    }

    /// Run `commands` in order on every host over one session per host
    ///
    /// The first failing command stops the remaining commands for that host
    /// only.
    ///
    /// # Errors
    /// Returns `FanoutError::AllHostsFailed` with the full report if no host
    /// completed its batch
    #[instrument(skip(self, commands), fields(hosts = self.hosts.len(), commands = commands.len(), transport = self.connector.transport()))]
    pub async fn run_batch_on_all<S>(&self, commands: &[S]) -> Result<FanoutReport, FanoutError>
    where
        S: AsRef<str> + Sync,
    {
        let start = Instant::now();
        let mut report = FanoutReport::default();

        for (index, host) in self.hosts.iter().enumerate() {
            push_header(&mut report.text, index, host);

            let config = self.template.for_host(host);
            let mut session = match self.connector.connect(&config).await {
                Ok(session) => session,
                Err(e) => {
                    report.failed += 1;
                    warn!(host = %host, error = %e, "connect failed");
                    let _ = writeln!(report.text, "error: {e}");
                    continue;
                }
            };

            let completed = run_batch(&mut session, commands, &mut report.text).await;
            close_session(&mut session, host).await;

            if completed {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            duration = ?start.elapsed(),
            "batch fan-out completed"
        );

        finish(report, BATCH_FAILED)
    }

    /// Connect, run one command and close
    async fn run_once(&self, host: &str, command: &str) -> Result<Vec<u8>, ExecError> {
        let config = self.template.for_host(host);
        let mut session = self.connector.connect(&config).await?;
        let result = session.run(command).await;
        close_session(&mut session, host).await;
        result
    }
}

/// Run a batch over one session, appending each command's section
///
/// Returns whether every command succeeded.
async fn run_batch<R, S>(session: &mut R, commands: &[S], out: &mut String) -> bool
where
    R: RemoteSession,
    S: AsRef<str> + Sync,
{
    for (index, command) in commands.iter().enumerate() {
        let command = command.as_ref();
        match session.run(command).await {
            Ok(output) => {
                if index > 0 {
                    out.push('\n');
                }
                let _ = writeln!(out, "$ {command}");
                push_output(out, &String::from_utf8_lossy(&output));
            }
            Err(e) => {
                warn!(command = %command, error = %e, "batch command failed");
                let _ = writeln!(out, "command {} failed: {e}", index + 1);
                return false;
            }
        }
    }
    true
}

async fn close_session<R: RemoteSession>(session: &mut R, host: &str) {
    if let Err(e) = session.close().await {
        warn!(host = %host, error = %e, "failed to close session");
    }
}

fn push_header(out: &mut String, index: usize, host: &str) {
    if index > 0 {
        out.push('\n');
    }
    let _ = writeln!(out, "=== ssh_host {host} ===");
}

fn push_output(out: &mut String, text: &str) {
    out.push_str(text);
    if !text.is_empty() && !text.ends_with('\n') {
        out.push('\n');
    }
}

fn finish(report: FanoutReport, summary: &'static str) -> Result<FanoutReport, FanoutError> {
    if report.any_succeeded() {
        Ok(report)
    } else {
        Err(FanoutError::AllHostsFailed {
            summary,
            report: report.text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_output_adds_newline() {
        let mut out = String::new();
        push_output(&mut out, "abc");
        push_output(&mut out, "def\n");
        push_output(&mut out, "");
        assert_eq!(out, "abc\ndef\n");
    }

    #[test]
    fn test_push_header_separates_hosts() {
        let mut out = String::new();
        push_header(&mut out, 0, "a");
        out.push_str("x\n");
        push_header(&mut out, 1, "b");
        assert_eq!(out, "=== ssh_host a ===\nx\n\n=== ssh_host b ===\n");
    }

    #[test]
    fn test_finish_all_failed() {
        let report = FanoutReport {
            text: "=== ssh_host a ===\nerror: boom\n".to_string(),
            succeeded: 0,
            failed: 1,
        };
        let err = finish(report, SINGLE_FAILED).unwrap_err();
        assert_eq!(
            err.to_string(),
            "command failed on all SSH hosts:\n=== ssh_host a ===\nerror: boom\n"
        );
    }
}
