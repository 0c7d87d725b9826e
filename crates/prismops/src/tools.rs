//! Tool operations shared by the MCP server and the CLI
//!
//! Each operation validates its parameters first, then the settings it
//! needs, then fans out or calls Prism. Results are plain text ready to be
//! returned to the caller.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, instrument};

use prismops_exec::{Connector, FanoutError, MultiHostExecutor};
use prismops_logs::{
    FetchTarget, LogsError, crash_critical_command, critical_logs_command,
    kernel_critical_command, parse_commands, parse_lines,
};
use prismops_prism::{PrismClient, PrismError, api_namespaces};
use url::Url;

use crate::config::{ConfigError, Settings};

/// Errors returned by tool operations
#[derive(Error, Debug)]
pub enum ToolError {
    /// Caller supplied bad arguments
    #[error(transparent)]
    InvalidParams(#[from] LogsError),

    /// Settings missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Fan-out failed on every host
    #[error(transparent)]
    Fanout(#[from] FanoutError),

    /// Prism Central request failed
    #[error("Prism Central request failed: {0}")]
    Prism(#[from] PrismError),

    /// Result could not be rendered as JSON
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ToolError {
    /// Whether the caller, not the environment, is at fault
    #[must_use]
    pub fn is_invalid_params(&self) -> bool {
        matches!(self, ToolError::InvalidParams(_))
    }
}

/// Render `value` as pretty-printed JSON
///
/// # Errors
/// Returns `ToolError::Encode` if `value` cannot be represented as JSON
pub fn to_json_text<T: Serialize + ?Sized>(value: &T) -> Result<String, ToolError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Tool operations over one set of settings
#[derive(Debug, Clone)]
pub struct Toolbox<C> {
    settings: Arc<Settings>,
    connector: C,
    prism: Option<PrismClient>,
}

impl<C> Toolbox<C>
where
    C: Connector + Clone,
{
    /// Create a toolbox, building the Prism client when it is configured
    ///
    /// # Errors
    /// Returns `ToolError::Prism` if the Prism endpoint is not a valid URL
    pub fn new(settings: Arc<Settings>, connector: C) -> Result<Self, ToolError> {
        let prism = settings
            .prism
            .client_config()
            .map(|config| PrismClient::new(&config))
            .transpose()?;

        match &prism {
            Some(client) => info!(endpoint = %client.base_url(), "Prism Central client ready"),
            None => info!("Prism Central not configured, VM tools disabled"),
        }

        Ok(Self {
            settings,
            connector,
            prism,
        })
    }

    /// Loaded settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Prism Central base URL, when configured
    pub fn prism_endpoint(&self) -> Option<&Url> {
        self.prism.as_ref().map(PrismClient::base_url)
    }

    fn executor(&self) -> Result<MultiHostExecutor<C>, ToolError> {
        let (template, hosts) = self.settings.ssh.target()?;
        Ok(MultiHostExecutor::new(
            self.connector.clone(),
            template,
            hosts,
        )?)
    }

    fn prism(&self) -> Result<&PrismClient, ToolError> {
        self.prism
            .as_ref()
            .ok_or(ToolError::Config(ConfigError::PrismNotConfigured))
    }

    /// Run one command on every host
    ///
    /// # Errors
    /// Returns `ToolError` if `command` is blank, settings are invalid or
    /// every host failed
    #[instrument(skip(self))]
    pub async fn ssh_exec(&self, command: &str) -> Result<String, ToolError> {
        let command = command.trim();
        if command.is_empty() {
            return Err(LogsError::Missing("command").into());
        }

        let report = self.executor()?.run_on_all(command).await?;
        Ok(report.text)
    }

    /// Run newline-separated commands in order on every host
    ///
    /// # Errors
    /// Returns `ToolError` if no command is given, settings are invalid or
    /// no host completed the batch
    #[instrument(skip(self))]
    pub async fn ssh_exec_batch(&self, commands: &str) -> Result<String, ToolError> {
        let commands = parse_commands(commands);
        if commands.is_empty() {
            return Err(LogsError::Missing("commands").into());
        }

        let report = self.executor()?.run_batch_on_all(commands.as_slice()).await?;
        Ok(report.text)
    }

    /// Critical kernel messages from every host
    ///
    /// # Errors
    /// Returns `ToolError` if `lines` is invalid, settings are invalid or
    /// every host failed
    #[instrument(skip(self))]
    pub async fn kernel_logs_critical(&self, lines: Option<&str>) -> Result<String, ToolError> {
        let lines = parse_lines(lines)?;
        let report = self
            .executor()?
            .run_on_all(&kernel_critical_command(lines))
            .await?;
        Ok(report.text)
    }

    /// Critical crash-log lines from every host
    ///
    /// # Errors
    /// Returns `ToolError` if `lines` is invalid, settings are invalid or
    /// every host failed
    #[instrument(skip(self))]
    pub async fn crash_logs_critical(&self, lines: Option<&str>) -> Result<String, ToolError> {
        let lines = parse_lines(lines)?;
        let report = self
            .executor()?
            .run_on_all(&crash_critical_command(lines))
            .await?;
        Ok(report.text)
    }

    /// Kernel, crash and fatal service logs from every host
    ///
    /// # Errors
    /// Returns `ToolError` if `lines` is invalid, settings are invalid or
    /// every host failed
    #[instrument(skip(self))]
    pub async fn critical_logs(&self, lines: Option<&str>) -> Result<String, ToolError> {
        let lines = parse_lines(lines)?;
        let command = critical_logs_command(lines, &self.settings.ssh.log_root);
        let report = self.executor()?.run_on_all(&command).await?;
        Ok(report.text)
    }

    /// Copy a file under the log root from every host to the output directory
    ///
    /// # Errors
    /// Returns `ToolError` if `path` is invalid, settings are invalid or no
    /// host's file could be fetched and stored
    #[instrument(skip(self))]
    pub async fn fetch_service(&self, path: Option<&str>) -> Result<String, ToolError> {
        let ssh = &self.settings.ssh;
        let target = FetchTarget::resolve(&ssh.log_root, path)?;
        let executor = self.executor()?;
        let output_dir = ssh.output_dir.as_path();

        let report = executor
            .run_on_all_with(&target.command(), |host, data| {
                // blocking write; hosts are visited one at a time
                let local = target.store(output_dir, host, &data)?;
                Ok(format!(
                    "fetched {} ({} bytes) to {}",
                    target.remote_path,
                    data.len(),
                    local.display()
                ))
            })
            .await?;
        Ok(report.text)
    }

    /// List VMs as JSON
    ///
    /// With `length`, returns that single page; otherwise every page.
    ///
    /// # Errors
    /// Returns `ToolError` if Prism is not configured or the request fails
    #[instrument(skip(self))]
    pub async fn vm_list(
        &self,
        length: Option<u32>,
        filter: Option<&str>,
    ) -> Result<String, ToolError> {
        let prism = self.prism()?;
        let filter = filter.map(str::trim).filter(|f| !f.is_empty());

        let listing = match length {
            Some(length) => prism.list_vms(length, 0, filter).await?,
            None => prism.list_all_vms(filter).await?,
        };

        let body = json!({
            "total": listing.total(),
            "vms": listing.summaries(),
            "entities": listing.entities,
        });
        to_json_text(&body)
    }

    /// Count VMs as JSON
    ///
    /// # Errors
    /// Returns `ToolError` if Prism is not configured or the request fails
    #[instrument(skip(self))]
    pub async fn vm_count(&self, filter: Option<&str>) -> Result<String, ToolError> {
        let prism = self.prism()?;
        let filter = filter.map(str::trim).filter(|f| !f.is_empty());

        let count = prism.count_vms(filter).await?;
        Ok(json!({ "count": count }).to_string())
    }

    /// Known Prism Central API namespaces as JSON
    ///
    /// Answers from the built-in catalog, so it works without Prism settings.
    ///
    /// # Errors
    /// Returns `ToolError::Encode` if the catalog cannot be rendered
    pub fn api_namespaces_list(&self) -> Result<String, ToolError> {
        let namespaces: Vec<Value> = api_namespaces()
            .iter()
            .map(|ns| {
                json!({
                    "name": ns.name,
                    "version": ns.version,
                    "base_path": ns.base_path(),
                    "description": ns.description,
                })
            })
            .collect();
        to_json_text(&json!({ "namespaces": namespaces }))
    }

    /// One VM by UUID
    ///
    /// # Errors
    /// Returns `ToolError` if `uuid` is blank, Prism is not configured or the
    /// request fails
    #[instrument(skip(self))]
    pub async fn vm_get(&self, uuid: &str) -> Result<Value, ToolError> {
        let uuid = uuid.trim();
        if uuid.is_empty() {
            return Err(LogsError::Missing("uuid").into());
        }
        Ok(self.prism()?.get_vm(uuid).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_json_text_encode_error_is_reported() {
        let ok = to_json_text(&json!({ "count": 2 })).unwrap();
        assert_eq!(ok, "{\n  \"count\": 2\n}");

        // tuple keys have no JSON object representation
        let bad: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);
        let err = to_json_text(&bad).unwrap_err();
        assert!(matches!(err, ToolError::Encode(_)));
        assert!(!err.is_invalid_params());
        assert!(err.to_string().starts_with("failed to encode result:"));
    }
}
