//! prismops: remote operations over MCP
//!
//! Loads settings, exposes the SSH fan-out and Prism Central tools as an MCP
//! server over stdio or streamable HTTP, and runs the same tools one-shot
//! from the command line.

pub mod config;
pub mod mcp;
pub mod router;
pub mod tools;

pub use config::{ConfigError, Settings};
pub use mcp::PrismOpsServer;
pub use tools::{ToolError, Toolbox};
