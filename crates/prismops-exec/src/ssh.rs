//! SSH command execution using russh crate

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use russh::keys::{check_known_hosts, ssh_key};
use russh::{ChannelMsg, Disconnect, client};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::error::ExecError;
use crate::result::{ConnectionConfig, HostKeyPolicy};
use crate::traits::{Connector, RemoteSession};

/// Environment overrides sent before every command.
///
/// Non-interactive shells source `$BASH_ENV` / `$ENV`; pointing both at
/// `/dev/null` keeps profile scripts from polluting output.
const SHELL_SAFE_ENV: [(&str, &str); 2] = [("BASH_ENV", "/dev/null"), ("ENV", "/dev/null")];

/// SSH client handler for russh
#[derive(Debug)]
struct SshClientHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
}

impl client::Handler for SshClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        match self.policy {
            HostKeyPolicy::AcceptAny => Ok(true),
            HostKeyPolicy::KnownHosts => {
                match check_known_hosts(&self.host, self.port, server_public_key) {
                    Ok(known) => {
                        if !known {
                            warn!(host = %self.host, "host key not found in known_hosts");
                        }
                        Ok(known)
                    }
                    Err(e) => {
                        warn!(host = %self.host, error = %e, "host key verification failed");
                        Ok(false)
                    }
                }
            }
        }
    }
}

/// Dials SSH sessions with password authentication
#[derive(Debug, Clone, Default)]
pub struct SshConnector {
    config: Arc<client::Config>,
}

impl SshConnector {
    /// Create a connector with default russh client settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self, config), fields(host = %config.host))]
    async fn dial(&self, config: &ConnectionConfig) -> Result<SshSession, ExecError> {
        let (addr, port) = config.endpoint();

        info!(
            host = %addr,
            port = port,
            user = %config.username,
            host_key_policy = %config.host_key_policy,
            "connecting to SSH"
        );

        let handler = SshClientHandler {
            host: addr.clone(),
            port,
            policy: config.host_key_policy,
        };

        let mut session = client::connect(self.config.clone(), (addr.as_str(), port), handler)
            .await
            .map_err(|e| match e {
                russh::Error::UnknownKey => ExecError::HostKeyRejected(format!(
                    "{addr}:{port} is not a known host ({} policy)",
                    config.host_key_policy
                )),
                other => ExecError::ConnectionFailed(other.to_string()),
            })?;

        let auth_res = session
            .authenticate_password(&config.username, &config.password)
            .await
            .map_err(|e| ExecError::AuthenticationFailed(e.to_string()))?;

        if !auth_res.success() {
            return Err(ExecError::AuthenticationFailed(
                "password authentication rejected".to_string(),
            ));
        }

        info!(host = %config.host, "SSH connected and authenticated");

        Ok(SshSession {
            host: config.host.clone(),
            handle: Some(session),
        })
    }
}

#[async_trait]
impl Connector for SshConnector {
    type Session = SshSession;

    async fn connect(&self, config: &ConnectionConfig) -> Result<SshSession, ExecError> {
        match timeout(config.timeout, self.dial(config)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(host = %config.host, timeout = ?config.timeout, "SSH connect timed out");
                Err(ExecError::Timeout {
                    timeout: config.timeout,
                })
            }
        }
    }

    fn transport(&self) -> &'static str {
        "ssh"
    }
}

/// Authenticated SSH session to one host
pub struct SshSession {
    host: String,
    handle: Option<client::Handle<SshClientHandler>>,
}

impl std::fmt::Debug for SshSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshSession")
            .field("host", &self.host)
            .field("connected", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RemoteSession for SshSession {
    #[instrument(skip(self, command), fields(host = %self.host))]
    async fn run(&mut self, command: &str) -> Result<Vec<u8>, ExecError> {
        let session = self.handle.as_ref().ok_or(ExecError::NotConnected)?;

        debug!(command = %command, "executing remote command");

        let start = Instant::now();

        let mut channel = session
            .channel_open_session()
            .await
            .map_err(|e| ExecError::Channel(e.to_string()))?;

        // Env requests are channel scoped, so they go out on every channel
        for (name, value) in SHELL_SAFE_ENV {
            if let Err(e) = channel.set_env(false, name, value).await {
                debug!(variable = name, error = %e, "server refused env request");
            }
        }

        channel
            .exec(true, command)
            .await
            .map_err(|e| ExecError::Channel(e.to_string()))?;

        let mut output = Vec::new();
        let mut status = None;
        let mut signal = None;

        // Exit status may arrive after EOF, so drain until the channel closes
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { data } => output.extend_from_slice(&data),
                ChannelMsg::ExtendedData { data, ext } if ext == 1 => {
                    output.extend_from_slice(&data);
                }
                ChannelMsg::ExitStatus { exit_status } => {
                    status = Some(exit_status.cast_signed());
                }
                ChannelMsg::ExitSignal { signal_name, .. } => {
                    signal = Some(format!("{signal_name:?}"));
                }
                _ => {}
            }
        }

        debug!(
            command = %command,
            status = ?status,
            bytes = output.len(),
            duration = ?start.elapsed(),
            "remote command completed"
        );

        match (status, signal) {
            (Some(0), _) => Ok(output),
            (_, Some(signal)) => Err(ExecError::Signaled {
                signal,
                output: String::from_utf8_lossy(&output).into_owned(),
            }),
            (status, None) => Err(ExecError::CommandFailed {
                status: status.unwrap_or(-1),
                output: String::from_utf8_lossy(&output).into_owned(),
            }),
        }
    }

    async fn close(&mut self) -> Result<(), ExecError> {
        if let Some(session) = self.handle.take() {
            session
                .disconnect(Disconnect::ByApplication, "", "English")
                .await
                .map_err(|e| ExecError::Channel(e.to_string()))?;
            info!(host = %self.host, "SSH disconnected");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_run_after_close_is_not_connected() {
        let mut session = SshSession {
            host: "h".to_string(),
            handle: None,
        };

        session.close().await.unwrap();
        let err = session.run("true").await.unwrap_err();
        assert!(matches!(err, ExecError::NotConnected));
    }

    #[tokio::test]
    async fn test_connect_refused_is_connect_error() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = ConnectionConfig::new("127.0.0.1", "u", "p")
            .with_port(port)
            .with_timeout(Duration::from_secs(2));
        let err = SshConnector::new().connect(&config).await.unwrap_err();

        assert!(err.is_connect_error(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_connect_times_out() {
        // Accepts TCP but never speaks SSH
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _guard = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let config = ConnectionConfig::new("127.0.0.1", "u", "p")
            .with_port(port)
            .with_timeout(Duration::from_millis(200));
        let err = SshConnector::new().connect(&config).await.unwrap_err();

        assert!(matches!(err, ExecError::Timeout { .. }));
    }

    #[tokio::test]
    #[ignore = "requires SSH server"]
    async fn test_ssh_password_session() {
        let host = std::env::var("SSH_HOST").unwrap();
        let config = ConnectionConfig::new(
            host,
            std::env::var("SSH_USERNAME").unwrap(),
            std::env::var("SSH_PASSWORD").unwrap(),
        )
        .with_host_key_policy(HostKeyPolicy::AcceptAny);

        let mut session = SshConnector::new().connect(&config).await.unwrap();
        let out = session.run("echo $BASH_ENV").await.unwrap();
        session.close().await.unwrap();

        assert_eq!(String::from_utf8_lossy(&out).trim(), "/dev/null");
    }
}
