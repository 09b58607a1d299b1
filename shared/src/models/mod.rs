//! Data models
//!
//! Mirrors the backend's JSON documents. Identifiers are the backend's
//! string `_id` values; field names are camelCase on the wire.

pub mod bill;
pub mod bill_number;
pub mod category;
pub mod product;
pub mod tax;

// Re-exports
pub use bill::*;
pub use bill_number::*;
pub use category::*;
pub use product::*;
pub use tax::*;
