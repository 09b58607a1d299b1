//! Category Model

use serde::{Deserialize, Serialize};

/// Lifecycle status shared by products and categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogStatus {
    #[default]
    Active,
    Inactive,
}

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: CatalogStatus,
}

/// Category reference embedded in a product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CategoryRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}
