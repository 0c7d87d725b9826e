//! Catalog of Prism Central API namespaces

use serde::Serialize;

/// One Prism Central API namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApiNamespace {
    /// Path segment after `/api/`
    pub name: &'static str,
    /// Newest API version served under this namespace
    pub version: &'static str,
    pub description: &'static str,
}

impl ApiNamespace {
    /// Path prefix for requests in this namespace, e.g. `/api/vmm/v4.0/`
    #[must_use]
    pub fn base_path(&self) -> String {
        format!("/api/{}/{}/", self.name, self.version)
    }
}

const NAMESPACES: &[ApiNamespace] = &[
    ApiNamespace {
        name: "nutanix",
        version: "v3",
        description: "Intent-based v3 API (VMs, clusters, subnets, images); used by the VM tools",
    },
    ApiNamespace {
        name: "aiops",
        version: "v4.0",
        description: "Capacity planning, runway and operational insights",
    },
    ApiNamespace {
        name: "clustermgmt",
        version: "v4.0",
        description: "Clusters, hosts, disks and storage containers",
    },
    ApiNamespace {
        name: "dataprotection",
        version: "v4.0",
        description: "Recovery points and protected resources",
    },
    ApiNamespace {
        name: "datapolicies",
        version: "v4.0",
        description: "Protection, storage and data policies",
    },
    ApiNamespace {
        name: "files",
        version: "v4.0",
        description: "Nutanix Files servers and shares",
    },
    ApiNamespace {
        name: "iam",
        version: "v4.0",
        description: "Users, roles, authorization policies and directory services",
    },
    ApiNamespace {
        name: "licensing",
        version: "v4.0",
        description: "Licenses, entitlements and compliance",
    },
    ApiNamespace {
        name: "lifecycle",
        version: "v4.0",
        description: "Life Cycle Manager inventory and upgrades",
    },
    ApiNamespace {
        name: "microseg",
        version: "v4.0",
        description: "Flow network security policies",
    },
    ApiNamespace {
        name: "monitoring",
        version: "v4.0",
        description: "Alerts, events and audits",
    },
    ApiNamespace {
        name: "networking",
        version: "v4.0",
        description: "Subnets, VPCs, floating IPs and routing",
    },
    ApiNamespace {
        name: "objects",
        version: "v4.0",
        description: "Object store instances",
    },
    ApiNamespace {
        name: "opsmgmt",
        version: "v4.0",
        description: "Reports and operations management",
    },
    ApiNamespace {
        name: "prism",
        version: "v4.0",
        description: "Tasks, categories and batch operations",
    },
    ApiNamespace {
        name: "security",
        version: "v4.0",
        description: "Security configuration and STIG compliance",
    },
    ApiNamespace {
        name: "vmm",
        version: "v4.0",
        description: "Virtual machines, images and templates",
    },
    ApiNamespace {
        name: "volumes",
        version: "v4.0",
        description: "Volume groups and iSCSI clients",
    },
];

/// Every known namespace, v3 first then v4 namespaces by name
#[must_use]
pub fn api_namespaces() -> &'static [ApiNamespace] {
    NAMESPACES
}
