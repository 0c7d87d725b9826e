//! Remote session traits

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::ConnectionConfig;

/// Opens sessions to remote hosts
#[async_trait]
pub trait Connector: Send + Sync {
    type Session: RemoteSession;

    /// Connect and authenticate to `config.host`
    async fn connect(&self, config: &ConnectionConfig) -> Result<Self::Session, ExecError>;

    /// Transport name for logging
    fn transport(&self) -> &'static str;
}

/// One established session to one host
///
/// Commands run one at a time; a session is not used after `close`.
#[async_trait]
pub trait RemoteSession: Send {
    /// Run a command, returning its combined stdout/stderr
    ///
    /// A non-zero exit is an error that still carries the captured output.
    async fn run(&mut self, command: &str) -> Result<Vec<u8>, ExecError>;

    /// Release the session
    async fn close(&mut self) -> Result<(), ExecError>;
}
