//! Bill-number sequence

use serde::{Deserialize, Serialize};

/// Current state of the server-side bill-number sequence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BillNumber {
    /// Human-readable bill number to print
    #[serde(default)]
    pub current_bill_number: String,
    /// Sequence counter
    pub number: i64,
}

impl BillNumber {
    pub fn is_usable(&self) -> bool {
        !self.current_bill_number.trim().is_empty()
    }
}
