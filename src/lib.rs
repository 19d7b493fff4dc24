//! nessus-client - Thin client for the Nessus vulnerability scanner REST API
//!
//! This library authenticates against a remote scanner (username/password
//! session tokens or static API key pairs) and exposes one method per REST
//! resource: server status, scan listing, scan export, host and plugin
//! detail retrieval. Each call is a single stateless request/response;
//! response schemas are owned by the server and passed through as JSON.
//!
//! ```no_run
//! use nessus_client::{Credentials, NessusClient};
//!
//! # async fn example() -> nessus_client::Result<()> {
//! let client = NessusClient::new(
//!     "https://scanner:8834",
//!     Credentials::api_keys("access", "secret"),
//!     true,
//! )?;
//! let status = client.server_status().await?;
//! println!("{}", status);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;

pub use auth::Credentials;
pub use client::{AlertQuery, NessusClient, ScanListQuery};
pub use error::{ClientError, Result};
pub use export::{ExportFormat, ExportRequest, ReportContents};
