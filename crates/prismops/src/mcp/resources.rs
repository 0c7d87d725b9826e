// MCP resource handlers
//
// Exposes Prism Central VMs as resources:
// - vm://{uuid} -> the VM's v3 JSON

use rmcp::model::*;

use prismops_exec::Connector;
use prismops_prism::PrismError;

use crate::tools::{ToolError, Toolbox, to_json_text};

/// URI scheme for VM resources.
const VM_SCHEME: &str = "vm://";

/// Extract the UUID from a `vm://{uuid}` URI.
pub fn parse_vm_uri(uri: &str) -> Option<&str> {
    uri.strip_prefix(VM_SCHEME)
        .map(|rest| rest.trim_end_matches('/'))
        .filter(|uuid| !uuid.is_empty() && !uuid.contains('/'))
}

/// List resource templates.
pub async fn list_resource_templates() -> Result<ListResourceTemplatesResult, ErrorData> {
    let templates = vec![
        RawResourceTemplate {
            uri_template: format!("{VM_SCHEME}{{uuid}}"),
            name: "vm".to_string(),
            title: Some("Virtual Machine".to_string()),
            description: Some(
                "A virtual machine registered with Prism Central, as returned by the v3 API."
                    .to_string(),
            ),
            mime_type: Some("application/json".to_string()),
            icons: None,
        }
        .no_annotation(),
    ];

    Ok(ListResourceTemplatesResult {
        meta: None,
        next_cursor: None,
        resource_templates: templates,
    })
}

/// Read a `vm://{uuid}` resource.
pub async fn read_resource<C>(
    toolbox: &Toolbox<C>,
    request: ReadResourceRequestParams,
) -> Result<ReadResourceResult, ErrorData>
where
    C: Connector + Clone,
{
    let uri = &request.uri;
    let uuid = parse_vm_uri(uri).ok_or_else(|| {
        ErrorData::resource_not_found(format!("unknown resource: {uri}"), None)
    })?;

    let vm = toolbox.vm_get(uuid).await.map_err(|e| match e {
        ToolError::Prism(PrismError::Api { status: 404, .. }) => {
            ErrorData::resource_not_found(format!("VM not found: {uuid}"), None)
        }
        ToolError::InvalidParams(e) => ErrorData::invalid_params(e.to_string(), None),
        other => ErrorData::internal_error(other.to_string(), None),
    })?;

    let json = to_json_text(&vm).map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
    Ok(ReadResourceResult {
        contents: vec![ResourceContents::text(json, uri.clone())],
    })
}
