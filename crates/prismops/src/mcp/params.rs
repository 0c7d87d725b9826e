// MCP tool parameter types

use serde::{Deserialize, Deserializer};

/// Parameters for the `ssh_exec` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExecParams {
    #[schemars(description = "Command to execute on each SSH host.")]
    pub command: String,
}

/// Parameters for the `ssh_exec_batch` tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct BatchParams {
    #[schemars(description = "Newline-separated commands to execute in order on each SSH host.")]
    pub commands: String,
}

/// Parameters for the log-scan tools.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct LinesParams {
    /// Accepted as a string or a number.
    #[serde(default, deserialize_with = "string_or_number")]
    #[schemars(description = "Optional number of lines to return (default 50, max 500).")]
    pub lines: Option<String>,
}

/// Parameters for the `fetch_service` tool.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct FetchParams {
    #[schemars(
        description = "Optional file path under the log root (defaults to narsil.out). Saved locally as <host>_<file name>."
    )]
    pub path: Option<String>,
}

/// Parameters for the `vm_list` tool.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct VmListParams {
    #[schemars(description = "Page size. If omitted, every VM is returned.")]
    pub length: Option<u32>,

    #[schemars(description = "Optional FIQL filter, e.g. vm_name==web.*")]
    pub filter: Option<String>,
}

/// Parameters for the `vm_count` tool.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct VmCountParams {
    #[schemars(description = "Optional FIQL filter, e.g. power_state==ON")]
    pub filter: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_lines_accepts_string_or_number() {
        let p: LinesParams = serde_json::from_value(json!({"lines": "20"})).unwrap();
        assert_eq!(p.lines.as_deref(), Some("20"));

        let p: LinesParams = serde_json::from_value(json!({"lines": 20})).unwrap();
        assert_eq!(p.lines.as_deref(), Some("20"));

        let p: LinesParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(p.lines, None);
    }

    #[test]
    fn test_non_integer_lines_passed_through() {
        // Rejected later with the tool's own message
        let p: LinesParams = serde_json::from_value(json!({"lines": 1.5})).unwrap();
        assert_eq!(p.lines.as_deref(), Some("1.5"));
    }
}
