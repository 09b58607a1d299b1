//! Bill Model
//!
//! The bill is owned by the backend. The client only mirrors it into an
//! order draft and sends back whole documents on create/update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Product;

/// Bill status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BillStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Completed,
    Cancelled,
    BillPrinted,
    /// Any status this client does not know about
    #[serde(other)]
    Unknown,
}

impl BillStatus {
    /// Whether the table holds an editable order (a live KOT)
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Preparing | Self::Ready)
    }
}

/// Bill item status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Active,
    Canceled,
}

/// Kind of change recorded in an item's audit trail
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Add,
    Edit,
    Canceled,
}

/// Append-only audit record on a bill item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub change_type: ChangeType,
    /// Magnitude of the quantity change
    pub quantity: u32,
    pub timestamp: DateTime<Utc>,
    pub actor: String,
}

/// Server-side bill line item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    /// Absent for items that have not been stored yet
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub product: Product,
    pub quantity: u32,
    /// Unit price recorded on this row
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default)]
    pub updates: Vec<ItemUpdate>,
}

impl BillItem {
    /// Active rows with a positive quantity are the ones that count
    pub fn is_active(&self) -> bool {
        self.status != ItemStatus::Canceled && self.quantity > 0
    }

    pub fn is_canceled(&self) -> bool {
        self.status == ItemStatus::Canceled
    }

    pub fn product_id(&self) -> &str {
        &self.product.id
    }
}

/// Bill document
///
/// The same shape is used for the create and update payloads; `id` is
/// omitted on create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub bill_number: String,
    /// Sequence number the bill number was issued from
    #[serde(default)]
    pub number: i64,
    #[serde(default)]
    pub status: BillStatus,
    pub table_number: u32,
    #[serde(default)]
    pub items: Vec<BillItem>,
    #[serde(default)]
    pub sub_total: f64,
    /// SGST percent applied
    #[serde(default)]
    pub sgst: f64,
    /// CGST percent applied
    #[serde(default)]
    pub cgst: f64,
    #[serde(default)]
    pub sgst_amount: f64,
    #[serde(default)]
    pub cgst_amount: f64,
    /// Payable amount (floored)
    #[serde(default)]
    pub total_amount: f64,
}

impl Bill {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn active_items(&self) -> impl Iterator<Item = &BillItem> {
        self.items.iter().filter(|item| item.is_active())
    }
}
