//! Request/response DTOs for the backend API
//!
//! Shapes of the JSON bodies exchanged with the restaurant backend.
//! Entity types themselves live in [`crate::models`].

use serde::{Deserialize, Serialize};

use crate::models::{Bill, BillStatus, CatalogStatus, Product};

// =============================================================================
// Catalog API DTOs
// =============================================================================

/// `POST /api/category/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryQuery {
    pub statuses: Vec<CatalogStatus>,
}

/// `POST /api/product/all`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub status: Vec<CatalogStatus>,
    pub category_status: Vec<CatalogStatus>,
}

/// Envelope returned by `POST /api/product/all`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub data: ProductsData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductsData {
    #[serde(default)]
    pub products: Vec<Product>,
}

// =============================================================================
// Bill API DTOs
// =============================================================================

/// `POST /api/bill/getTableStatus`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStatusRequest {
    pub table_number: u32,
}

/// Result flag of a table status lookup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TableLookup {
    Success,
    TableFree,
    #[serde(other)]
    Unknown,
}

/// Response of `POST /api/bill/getTableStatus`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStatus {
    pub status: TableLookup,
    #[serde(default)]
    pub data: Option<Bill>,
}

impl TableStatus {
    /// The bill holding the table, if it is an editable order.
    ///
    /// A `success` lookup can still carry a completed or cancelled bill;
    /// those leave the table free.
    pub fn open_bill(&self) -> Option<&Bill> {
        if self.status != TableLookup::Success {
            return None;
        }
        self.data.as_ref().filter(|bill| bill.is_open())
    }

    pub fn into_open_bill(self) -> Option<Bill> {
        if self.status != TableLookup::Success {
            return None;
        }
        self.data.filter(|bill| bill.is_open())
    }
}

/// `PUT /api/bill/updateStatus`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillStatusUpdate {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: BillStatus,
}

// =============================================================================
// Bill number API DTOs
// =============================================================================

/// `PUT /api/billnumber/updateBillNumber`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillNumberUpdate {
    pub number: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_bill_leaves_table_free() {
        let json = r#"{"status": "success", "data": {"_id": "b1", "status": "completed", "tableNumber": 2}}"#;
        let status: TableStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.status, TableLookup::Success);
        assert!(status.open_bill().is_none());
    }

    #[test]
    fn test_table_free_response() {
        let status: TableStatus = serde_json::from_str(r#"{"status": "table-free"}"#).unwrap();
        assert_eq!(status.status, TableLookup::TableFree);
        assert!(status.into_open_bill().is_none());
    }

    #[test]
    fn test_pending_bill_is_open() {
        let json = r#"{"status": "success", "data": {"_id": "b1", "status": "pending", "tableNumber": 2}}"#;
        let status: TableStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.open_bill().and_then(|b| b.id.as_deref()), Some("b1"));
    }

    #[test]
    fn test_product_query_wire_shape() {
        let query = ProductQuery {
            status: vec![CatalogStatus::Active],
            category_status: vec![CatalogStatus::Active],
        };
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["categoryStatus"][0], "active");
    }
}
