//! Shared types for the KOT order client
//!
//! Wire models and request/response DTOs for the restaurant backend:
//! catalog entities, bills with their line items and audit trail,
//! tax settings and the bill-number sequence.

pub mod client;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    Bill, BillItem, BillNumber, BillStatus, CatalogStatus, Category, CategoryRef, ChangeType,
    ItemStatus, ItemUpdate, Product, TaxSettings,
};
