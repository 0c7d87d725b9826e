pub mod params;
pub mod prompts;
pub mod resources;

use std::sync::Arc;

use rmcp::{
    RoleServer, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use tracing::warn;

use prismops_exec::SshConnector;

use crate::tools::{ToolError, Toolbox};

use params::{BatchParams, ExecParams, FetchParams, LinesParams, VmCountParams, VmListParams};

/// Map a tool outcome onto the MCP result
///
/// Bad arguments are protocol errors; every other failure is returned as an
/// error result so the caller sees the full per-host report.
pub fn into_call_result(result: Result<String, ToolError>) -> Result<CallToolResult, ErrorData> {
    match result {
        Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
        Err(e) if e.is_invalid_params() => Err(ErrorData::invalid_params(e.to_string(), None)),
        Err(e) => {
            warn!(error = %e, "tool failed");
            Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
        }
    }
}

#[derive(Clone)]
pub struct PrismOpsServer {
    toolbox: Arc<Toolbox<SshConnector>>,
    tool_router: ToolRouter<PrismOpsServer>,
}

impl PrismOpsServer {
    pub fn new(toolbox: Arc<Toolbox<SshConnector>>) -> Self {
        Self {
            toolbox,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for PrismOpsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "prismops".to_string(),
                title: Some("Prism Central".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "Remote operations for Nutanix clusters: run commands and collect logs \
                     across SSH hosts, and query VMs through Prism Central."
                        .to_string(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Every SSH tool runs on each configured host in turn and returns one section \
                 per host headed '=== ssh_host <host> ==='. A tool fails only when every host \
                 failed. Use ssh_exec for one command, ssh_exec_batch for an ordered list, \
                 critical_logs for a combined kernel/crash/FATAL scan and fetch_service to copy \
                 a log file locally. vm_list, vm_count and vm://{uuid} need Prism Central;                  the set_credentials prompt explains how to configure it."
                    .to_string(),
            ),
        }
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParams>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        resources::list_resource_templates().await
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        resources::read_resource(&self.toolbox, request).await
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        prompts::list_prompts().await
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        prompts::get_prompt(&request.name, self.toolbox.prism_endpoint()).await
    }
}

#[tool_router]
impl PrismOpsServer {
    #[tool(description = "Execute a command on each SSH_HOST entry and return combined output.")]
    async fn ssh_exec(
        &self,
        Parameters(params): Parameters<ExecParams>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(self.toolbox.ssh_exec(&params.command).await)
    }

    #[tool(description = "Execute multiple commands on each SSH_HOST entry in order. A failing command stops the remaining commands on that host only.")]
    async fn ssh_exec_batch(
        &self,
        Parameters(params): Parameters<BatchParams>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(self.toolbox.ssh_exec_batch(&params.commands).await)
    }

    #[tool(description = "Fetch recent critical kernel messages from /var/log/messages on each SSH_HOST entry.")]
    async fn kernel_logs_critical(
        &self,
        Parameters(params): Parameters<LinesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(
            self.toolbox
                .kernel_logs_critical(params.lines.as_deref())
                .await,
        )
    }

    #[tool(description = "Fetch and summarize critical crash logs from /home/log/crash on each SSH_HOST entry.")]
    async fn crash_logs_critical(
        &self,
        Parameters(params): Parameters<LinesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(
            self.toolbox
                .crash_logs_critical(params.lines.as_deref())
                .await,
        )
    }

    #[tool(description = "Fetch critical kernel, crash and fatal service logs from each SSH_HOST entry.")]
    async fn critical_logs(
        &self,
        Parameters(params): Parameters<LinesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(self.toolbox.critical_logs(params.lines.as_deref()).await)
    }

    #[tool(description = "Fetch a file from the log root (default /home/nutanix/data/logs) of each SSH_HOST entry and save it locally.")]
    async fn fetch_service(
        &self,
        Parameters(params): Parameters<FetchParams>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(self.toolbox.fetch_service(params.path.as_deref()).await)
    }

    #[tool(description = "List VMs registered with Prism Central, optionally filtered.")]
    async fn vm_list(
        &self,
        Parameters(params): Parameters<VmListParams>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(
            self.toolbox
                .vm_list(params.length, params.filter.as_deref())
                .await,
        )
    }

    #[tool(description = "Count VMs registered with Prism Central, optionally filtered.")]
    async fn vm_count(
        &self,
        Parameters(params): Parameters<VmCountParams>,
    ) -> Result<CallToolResult, ErrorData> {
        into_call_result(self.toolbox.vm_count(params.filter.as_deref()).await)
    }

    #[tool(description = "List the Prism Central API namespaces and their base paths.")]
    async fn api_namespaces_list(&self) -> Result<CallToolResult, ErrorData> {
        into_call_result(self.toolbox.api_namespaces_list())
    }
}
