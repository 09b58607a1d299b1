//! Order flow errors
//!
//! Local guards (validation, conflict) are raised before any network call.
//! Every variant renders to a user-facing alert; none is fatal.

use thiserror::Error;

use super::line::LocalId;
use crate::error::ClientError;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("No table selected")]
    NoTableSelected,

    #[error("Order is empty")]
    EmptyDraft,

    #[error("Bill number unavailable")]
    MissingBillNumber,

    #[error("No active bill for this table")]
    NoActiveBill,

    #[error("Table {table} already has an open bill")]
    TableOccupied { table: u32 },

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Line not found: {0}")]
    LineNotFound(LocalId),

    #[error("Line cannot be edited: {0}")]
    LineNotEditable(LocalId),

    #[error("Line is not removed: {0}")]
    LineNotRestorable(LocalId),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl OrderError {
    /// Whether the caller must send the user back to login
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Client(err) if err.is_auth_failure())
    }

    /// Text for the user-visible notification
    pub fn alert(&self) -> String {
        match self {
            Self::NoTableSelected => "Please select a table first.".to_string(),
            Self::EmptyDraft => "Add at least one item to the order.".to_string(),
            Self::MissingBillNumber => {
                "Could not get a bill number. Please try again.".to_string()
            }
            Self::NoActiveBill => "This table has no active KOT.".to_string(),
            Self::TableOccupied { table } => format!(
                "Table {table} already has a KOT. Use \"Update KOT\" to change the order."
            ),
            Self::ProductNotFound(_) => "This product is no longer available.".to_string(),
            Self::LineNotFound(_) => "This item is no longer in the order.".to_string(),
            Self::LineNotEditable(_) => "Removed items must be restored first.".to_string(),
            Self::LineNotRestorable(_) => "Only removed items can be restored.".to_string(),
            Self::Client(err) => match err {
                ClientError::Network(_) => {
                    "Cannot reach the server. Check the connection and try again.".to_string()
                }
                ClientError::Unauthorized => {
                    "Your session has expired. Please log in again.".to_string()
                }
                ClientError::Session(_) => {
                    "Server address is not configured. Please log in again.".to_string()
                }
                ClientError::Forbidden(message)
                | ClientError::NotFound(message)
                | ClientError::Server { message, .. } => message.clone(),
                ClientError::InvalidResponse(_) | ClientError::Serialization(_) => {
                    "The server sent an unexpected response.".to_string()
                }
            },
        }
    }
}

/// Result type for order operations
pub type OrderResult<T> = Result<T, OrderError>;
