//! prismops-prism: Prism Central v3 API client
//!
//! Lists, counts and fetches virtual machines through the Prism Central
//! REST API, and describes the API namespaces Prism Central serves.
//!
//! ```no_run
//! use prismops_prism::{PrismClient, PrismConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PrismClient::new(&PrismConfig::new("pc.example.com", "admin", "secret"))?;
//!
//! let total = client.count_vms(None).await?;
//! println!("{total} VMs");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod namespaces;
pub mod types;

pub use client::{PrismClient, PrismConfig};
pub use error::{PrismError, Result};
pub use namespaces::{ApiNamespace, api_namespaces};
pub use types::{ListMetadata, VmListResponse, VmSummary};
