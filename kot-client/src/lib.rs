//! KOT Client - order-taking core for restaurant terminals
//!
//! Builds a table's order locally, sends it to the kitchen as a KOT (a bill
//! on the restaurant backend) and keeps the two in step afterwards.
//!
//! - [`api::BackendApi`]: typed calls to the backend over an [`HttpClient`]
//! - [`catalog::Catalog`]: categories and products for the order screen
//! - [`order::OrderSession`]: draft editing and the bill lifecycle
//!
//! # Example
//!
//! ```ignore
//! let config = ClientConfig::from_env();
//! config.init_logging()?;
//! let mut session = config.connect()?;
//! session.refresh_catalog().await?;
//! session.open_table(5).await?;
//! session.add_product("paneer-tikka")?;
//! session.submit_kot().await?;
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "in-process"))]
pub mod http_oneshot;
pub mod logger;
pub mod order;
pub mod session;

pub use api::BackendApi;
pub use catalog::Catalog;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, NetworkHttpClient};
#[cfg(any(test, feature = "in-process"))]
pub use http_oneshot::OneshotHttpClient;
pub use order::{OrderError, OrderResult, OrderSession};
pub use session::{FileSessionStore, MemorySessionStore, SessionData, SessionStore};

// Re-export shared types for convenience
pub use shared::models::{Bill, BillItem, BillStatus, Product, TaxSettings};
