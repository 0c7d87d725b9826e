// MCP prompt handlers
//
// Prompts carry setup guidance for the caller. Credentials are read once at
// startup, so a prompt can only explain how to change them.

use rmcp::model::*;
use url::Url;

use crate::config::{
    ENV_NUTANIX_ENDPOINT, ENV_NUTANIX_INSECURE, ENV_NUTANIX_PASSWORD, ENV_NUTANIX_USERNAME,
};

pub const SET_CREDENTIALS: &str = "set_credentials";

const SET_CREDENTIALS_DESCRIPTION: &str = "How to configure Prism Central credentials";

pub async fn list_prompts() -> Result<ListPromptsResult, ErrorData> {
    Ok(ListPromptsResult {
        prompts: vec![Prompt::new(
            SET_CREDENTIALS,
            Some(SET_CREDENTIALS_DESCRIPTION),
            None,
        )],
        next_cursor: None,
        meta: None,
    })
}

fn set_credentials_text(endpoint: Option<&Url>) -> String {
    let status = match endpoint {
        Some(url) => format!("Prism Central is configured at {url}."),
        None => "Prism Central is not configured; vm_list, vm_count and vm://{uuid} \
                 will fail until it is."
            .to_string(),
    };

    format!(
        "{status}\n\n\
         Prism Central credentials are read once when prismops starts. To set or \
         change them, set these environment variables for the server process:\n\n\
         - {ENV_NUTANIX_ENDPOINT}: Prism Central host or URL (port 9440 is assumed)\n\
         - {ENV_NUTANIX_USERNAME}: user name\n\
         - {ENV_NUTANIX_PASSWORD}: password\n\
         - {ENV_NUTANIX_INSECURE}: true to accept a self-signed certificate\n\n\
         or add them to the [prism] section of prismops.toml:\n\n\
         [prism]\n\
         endpoint = \"pc.example.com\"\n\
         username = \"admin\"\n\
         password = \"...\"\n\
         insecure = false\n\n\
         Environment variables override the file. Restart the server afterwards; \
         credentials cannot be changed while it is running."
    )
}

pub async fn get_prompt(name: &str, endpoint: Option<&Url>) -> Result<GetPromptResult, ErrorData> {
    if name != SET_CREDENTIALS {
        return Err(ErrorData::invalid_params(
            format!("unknown prompt: {name}"),
            None,
        ));
    }

    Ok(GetPromptResult {
        description: Some(SET_CREDENTIALS_DESCRIPTION.to_string()),
        messages: vec![PromptMessage::new_text(
            PromptMessageRole::User,
            set_credentials_text(endpoint),
        )],
    })
}
