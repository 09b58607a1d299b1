//! Order lines and their lifecycle state

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use shared::models::Product;

/// Stable per-line handle used for every user interaction.
///
/// Derived from the line kind and product id, so a re-sync regenerates the
/// same ids and the draft never holds a line without one. A product can
/// have an original and an addon line at once; their ids differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalId(String);

impl LocalId {
    pub(crate) fn for_line(kind: LineKind, product_id: &str) -> Self {
        Self(format!("{}:{}", kind.tag(), product_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Line classification without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Added to a table that has no KOT yet
    Draft,
    Original,
    Addon,
    Removed,
}

impl LineKind {
    fn tag(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Original => "orig",
            Self::Addon => "addon",
            Self::Removed => "removed",
        }
    }
}

/// Line state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LineState {
    /// Not yet sent to the kitchen; promoted to `Original` on submit
    Draft { quantity: u32 },
    /// Quantity confirmed on the submitted KOT
    Original { quantity: u32 },
    /// Requested after the KOT was sent; the kitchen sees it as a delta
    Addon { quantity: u32 },
    /// Quantity taken off the KOT. Bills nothing; `original_quantity` is the
    /// total before the removal, kept for display and restore.
    Removed { removed: u32, original_quantity: u32 },
}

impl LineState {
    pub fn kind(&self) -> LineKind {
        match self {
            Self::Draft { .. } => LineKind::Draft,
            Self::Original { .. } => LineKind::Original,
            Self::Addon { .. } => LineKind::Addon,
            Self::Removed { .. } => LineKind::Removed,
        }
    }
}

/// One line of the order draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub(crate) local_id: LocalId,
    pub(crate) product: Product,
    pub(crate) state: LineState,
    /// Backend item ids aggregated into this line (empty for local lines)
    pub(crate) server_item_ids: BTreeSet<String>,
}

impl OrderLine {
    pub(crate) fn new(product: Product, state: LineState) -> Self {
        Self {
            local_id: LocalId::for_line(state.kind(), &product.id),
            product,
            state,
            server_item_ids: BTreeSet::new(),
        }
    }

    pub(crate) fn with_server_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.server_item_ids.extend(ids);
        self
    }

    /// Replace the state, regenerating the local id if the kind changed
    pub(crate) fn set_state(&mut self, state: LineState) {
        if state.kind() != self.state.kind() {
            self.local_id = LocalId::for_line(state.kind(), &self.product.id);
        }
        self.state = state;
    }

    pub fn local_id(&self) -> &LocalId {
        &self.local_id
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    pub fn state(&self) -> LineState {
        self.state
    }

    pub fn kind(&self) -> LineKind {
        self.state.kind()
    }

    pub fn server_item_ids(&self) -> &BTreeSet<String> {
        &self.server_item_ids
    }

    /// Billable quantity; always 0 for removed lines
    pub fn quantity(&self) -> u32 {
        match self.state {
            LineState::Draft { quantity }
            | LineState::Original { quantity }
            | LineState::Addon { quantity } => quantity,
            LineState::Removed { .. } => 0,
        }
    }

    /// Quantity taken off the KOT (removed lines only)
    pub fn removed_quantity(&self) -> u32 {
        match self.state {
            LineState::Removed { removed, .. } => removed,
            _ => 0,
        }
    }

    pub fn original_quantity(&self) -> Option<u32> {
        match self.state {
            LineState::Removed {
                original_quantity, ..
            } => Some(original_quantity),
            _ => None,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.kind() == LineKind::Removed
    }

    /// "N removed of M" label for removed lines
    pub fn removal_label(&self) -> Option<String> {
        match self.state {
            LineState::Removed {
                removed,
                original_quantity,
            } => Some(format!("{removed} removed of {original_quantity}")),
            _ => None,
        }
    }
}
