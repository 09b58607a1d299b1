//! Product Model

use serde::{Deserialize, Serialize};

use super::{CatalogStatus, CategoryRef};

/// Product entity
///
/// Also used as the denormalized product snapshot carried by bill items,
/// which is why everything but the id and name has a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: CategoryRef,
    #[serde(default)]
    pub status: CatalogStatus,
    /// Unit-of-measure label (e.g. "plate", "pcs")
    #[serde(default)]
    pub unit: String,
    /// Unit price in currency unit; absent prices count as zero
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Product {
    /// Unit price, with a missing price treated as zero
    pub fn unit_price(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    pub fn belongs_to(&self, category_id: &str) -> bool {
        self.category.id == category_id
    }
}
