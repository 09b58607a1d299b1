//! Order flow
//!
//! - [`draft`]: the table's in-memory order and its line transitions
//! - [`reconcile`]: server bill → draft ([`sync`]) and draft → item edits ([`diff`])
//! - [`pricing`]: subtotal, GST and payable amount
//! - [`lifecycle`]: submit / update / cancel / complete against the backend

pub mod draft;
pub mod error;
pub mod lifecycle;
pub mod line;
pub mod pricing;
pub mod reconcile;

pub use draft::{BillRef, OrderDraft, TableState};
pub use error::{OrderError, OrderResult};
pub use lifecycle::{CancelOutcome, OrderSession, UpdateOutcome};
pub use line::{LineKind, LineState, LocalId, OrderLine};
pub use pricing::Totals;
pub use reconcile::{BillDiff, ItemChange, diff, sync};
