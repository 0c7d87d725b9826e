//! Prism v3 request and response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a v3 `list` call
#[derive(Debug, Clone, Serialize)]
pub struct ListRequest {
    pub kind: &'static str,
    pub length: u32,
    pub offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Paging metadata of a v3 `list` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMetadata {
    #[serde(default)]
    pub total_matches: Option<u64>,
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub kind: Option<String>,
}

/// Response of `POST /vms/list`
///
/// Entities are kept as raw JSON so callers see every field Prism returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VmListResponse {
    #[serde(default)]
    pub metadata: ListMetadata,
    #[serde(default)]
    pub entities: Vec<Value>,
}

impl VmListResponse {
    /// Total VMs matching the request, falling back to the entity count
    #[must_use]
    pub fn total(&self) -> u64 {
        self.metadata
            .total_matches
            .unwrap_or(self.entities.len() as u64)
    }

    /// Condensed view of each entity
    #[must_use]
    pub fn summaries(&self) -> Vec<VmSummary> {
        self.entities.iter().map(VmSummary::from_entity).collect()
    }
}

/// The fields of a VM entity most callers care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VmSummary {
    pub uuid: Option<String>,
    pub name: Option<String>,
    pub power_state: Option<String>,
    pub cluster: Option<String>,
}

impl VmSummary {
    /// Extract a summary from a raw v3 VM entity
    #[must_use]
    pub fn from_entity(entity: &Value) -> Self {
        let text = |pointer: &str| {
            entity
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Self {
            uuid: text("/metadata/uuid"),
            name: text("/spec/name").or_else(|| text("/status/name")),
            power_state: text("/status/resources/power_state")
                .or_else(|| text("/spec/resources/power_state")),
            cluster: text("/status/cluster_reference/name")
                .or_else(|| text("/spec/cluster_reference/name")),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_list_response_parse() {
        let body = json!({
            "api_version": "3.1",
            "metadata": {"kind": "vm", "total_matches": 42, "length": 2, "offset": 0},
            "entities": [
                {
                    "metadata": {"uuid": "u-1"},
                    "spec": {"name": "web-1", "cluster_reference": {"name": "c1"}},
                    "status": {"resources": {"power_state": "ON"}}
                },
                {"metadata": {"uuid": "u-2"}, "status": {"name": "db-1"}}
            ]
        });

        let resp: VmListResponse = serde_json::from_value(body).unwrap();

        assert_eq!(resp.total(), 42);
        assert_eq!(
            resp.summaries(),
            vec![
                VmSummary {
                    uuid: Some("u-1".into()),
                    name: Some("web-1".into()),
                    power_state: Some("ON".into()),
                    cluster: Some("c1".into()),
                },
                VmSummary {
                    uuid: Some("u-2".into()),
                    name: Some("db-1".into()),
                    power_state: None,
                    cluster: None,
                },
            ]
        );
    }

    #[test]
    fn test_total_without_metadata() {
        let resp: VmListResponse =
            serde_json::from_value(json!({"entities": [{}, {}, {}]})).unwrap();
        assert_eq!(resp.total(), 3);
    }

    #[test]
    fn test_list_request_skips_empty_filter() {
        let req = ListRequest {
            kind: "vm",
            length: 20,
            offset: 0,
            filter: None,
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"kind": "vm", "length": 20, "offset": 0})
        );
    }
}
