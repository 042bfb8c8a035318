//! Cluster API interaction module
//!
//! # Module Structure
//!
//! - [`client`] - Cluster client and endpoint builders
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use esbootstrap::cluster::{client, ClusterClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = ClusterClient::new("http://localhost:9200", None)?;
//!     let response = client.head(&client::index_template_path("template_1")).await?;
//!     println!("exists: {}", response.is_success());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;

pub use client::ClusterClient;
pub use http::{ClusterResponse, Payload};
