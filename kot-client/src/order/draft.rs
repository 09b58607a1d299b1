//! Order draft
//!
//! The in-memory order for one table. All mutation goes through the
//! transition methods below and is addressed by [`LocalId`]; product ids
//! are only used to find siblings of the same product.

use std::collections::BTreeMap;

use shared::models::{BillStatus, Product};

use super::error::{OrderError, OrderResult};
use super::line::{LineKind, LineState, LocalId, OrderLine};

/// The bill a draft is attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillRef {
    /// Backend id; absent when the create response did not echo one
    pub id: Option<String>,
    pub bill_number: String,
    pub status: BillStatus,
}

/// Table state as seen by the lifecycle controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Free,
    Open(BillStatus),
}

/// Per-product quantities as of the last sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SyncedQuantities {
    pub original: u32,
    pub removed: u32,
}

/// Order draft for one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderDraft {
    table: Option<u32>,
    bill: Option<BillRef>,
    lines: Vec<OrderLine>,
    synced: BTreeMap<String, SyncedQuantities>,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty draft for a table with no open bill
    pub fn for_table(table: u32) -> Self {
        Self {
            table: Some(table),
            ..Self::default()
        }
    }

    pub(crate) fn from_synced(
        table: u32,
        bill: BillRef,
        lines: Vec<OrderLine>,
        synced: BTreeMap<String, SyncedQuantities>,
    ) -> Self {
        Self {
            table: Some(table),
            bill: Some(bill),
            lines,
            synced,
        }
    }

    // ========== Queries ==========

    pub fn table(&self) -> Option<u32> {
        self.table
    }

    pub fn bill(&self) -> Option<&BillRef> {
        self.bill.as_ref()
    }

    pub fn bill_id(&self) -> Option<&str> {
        self.bill.as_ref().and_then(|b| b.id.as_deref())
    }

    /// Whether a KOT has been sent for this draft
    pub fn is_submitted(&self) -> bool {
        self.bill.is_some()
    }

    pub fn table_state(&self) -> TableState {
        match &self.bill {
            Some(bill) => TableState::Open(bill.status),
            None => TableState::Free,
        }
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn line(&self, local_id: &LocalId) -> Option<&OrderLine> {
        self.lines.iter().find(|l| &l.local_id == local_id)
    }

    /// Line of a given kind for a product (at most one exists)
    pub fn find(&self, product_id: &str, kind: LineKind) -> Option<&OrderLine> {
        self.lines
            .iter()
            .find(|l| l.product_id() == product_id && l.kind() == kind)
    }

    /// No billable quantity left
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.quantity() == 0)
    }

    /// Billable quantity of a product across its original and addon lines
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.lines
            .iter()
            .filter(|l| l.product_id() == product_id)
            .map(OrderLine::quantity)
            .sum()
    }

    /// Whether "Update KOT" has anything to send.
    ///
    /// True when an addon has quantity, an original quantity differs from
    /// the last sync, or a synced line was removed or restored.
    pub fn has_pending_changes(&self) -> bool {
        let unsent = self
            .lines
            .iter()
            .any(|l| matches!(l.kind(), LineKind::Addon | LineKind::Draft) && l.quantity() > 0);
        if unsent {
            return true;
        }

        let drifted = self.synced.iter().any(|(product_id, synced)| {
            self.current_quantities(product_id) != *synced
        });
        if drifted {
            return true;
        }

        self.lines
            .iter()
            .any(|l| !l.is_removed() && !self.synced.contains_key(l.product_id()))
    }

    /// Quantity per product the server should end up with.
    ///
    /// Works per product rather than per line: the original quantity (or,
    /// when the original line is gone, the synced quantity minus what was
    /// removed since) plus any unsent quantity. Products appear in line
    /// order, followed by synced products without lines.
    pub fn desired_quantities(&self) -> Vec<(String, u32)> {
        let mut order: Vec<&str> = Vec::new();
        for line in &self.lines {
            if !order.contains(&line.product_id()) {
                order.push(line.product_id());
            }
        }
        for product_id in self.synced.keys() {
            if !order.contains(&product_id.as_str()) {
                order.push(product_id);
            }
        }

        order
            .into_iter()
            .map(|product_id| {
                let confirmed = match self.find(product_id, LineKind::Original) {
                    Some(line) => line.quantity(),
                    None => {
                        let synced = self.synced.get(product_id).copied().unwrap_or_default();
                        let removed_now = self
                            .find(product_id, LineKind::Removed)
                            .map_or(0, OrderLine::removed_quantity);
                        let removed_since = removed_now.saturating_sub(synced.removed);
                        synced.original.saturating_sub(removed_since)
                    }
                };
                let unsent: u32 = self
                    .lines
                    .iter()
                    .filter(|l| {
                        l.product_id() == product_id
                            && matches!(l.kind(), LineKind::Addon | LineKind::Draft)
                    })
                    .map(OrderLine::quantity)
                    .sum();
                (product_id.to_string(), confirmed + unsent)
            })
            .collect()
    }

    /// Product snapshot held by any line of this product
    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.lines
            .iter()
            .find(|l| l.product_id() == product_id)
            .map(OrderLine::product)
    }

    fn current_quantities(&self, product_id: &str) -> SyncedQuantities {
        SyncedQuantities {
            original: self
                .find(product_id, LineKind::Original)
                .map_or(0, OrderLine::quantity),
            removed: self
                .find(product_id, LineKind::Removed)
                .map_or(0, OrderLine::removed_quantity),
        }
    }

    fn position(&self, local_id: &LocalId) -> OrderResult<usize> {
        self.lines
            .iter()
            .position(|l| &l.local_id == local_id)
            .ok_or_else(|| OrderError::LineNotFound(local_id.clone()))
    }

    fn position_of(&self, product_id: &str, kind: LineKind) -> Option<usize> {
        self.lines
            .iter()
            .position(|l| l.product_id() == product_id && l.kind() == kind)
    }

    // ========== Transitions ==========

    /// Add one unit of a product.
    ///
    /// Before the KOT is sent the product goes on an unsent draft line.
    /// Afterwards it always goes on the product's addon line, never onto
    /// the original line, so the kitchen sees the addition as a delta.
    pub fn add_product(&mut self, product: &Product) -> LocalId {
        let kind = if self.is_submitted() {
            LineKind::Addon
        } else {
            LineKind::Draft
        };

        if let Some(idx) = self.position_of(&product.id, kind) {
            let line = &mut self.lines[idx];
            let quantity = line.quantity() + 1;
            line.set_state(unsent_state(kind, quantity));
            return line.local_id.clone();
        }

        let line = OrderLine::new(product.clone(), unsent_state(kind, 1));
        let local_id = line.local_id.clone();
        self.lines.push(line);
        local_id
    }

    /// Increment a line. Incrementing an original line adds to its addon.
    pub fn increment(&mut self, local_id: &LocalId) -> OrderResult<LocalId> {
        let idx = self.position(local_id)?;
        let state = self.lines[idx].state;
        match state {
            LineState::Draft { quantity } | LineState::Addon { quantity } => {
                let kind = state.kind();
                self.lines[idx].set_state(unsent_state(kind, quantity + 1));
                Ok(local_id.clone())
            }
            LineState::Original { .. } => {
                let product = self.lines[idx].product.clone();
                Ok(self.add_product(&product))
            }
            LineState::Removed { .. } => Err(OrderError::LineNotEditable(local_id.clone())),
        }
    }

    /// Decrement a line by one.
    ///
    /// Unsent lines are deleted at zero. Original lines move the unit onto
    /// the product's removed line, which records the pre-edit total; an
    /// original line reaching zero is replaced by its removed line.
    pub fn decrement(&mut self, local_id: &LocalId) -> OrderResult<()> {
        let idx = self.position(local_id)?;
        let state = self.lines[idx].state;
        match state {
            LineState::Draft { quantity } | LineState::Addon { quantity } => {
                if quantity <= 1 {
                    self.lines.remove(idx);
                } else {
                    self.lines[idx].set_state(unsent_state(state.kind(), quantity - 1));
                }
                Ok(())
            }
            LineState::Original { quantity } => {
                let product_id = self.lines[idx].product_id().to_string();
                let removed_before = self
                    .find(&product_id, LineKind::Removed)
                    .map_or(0, OrderLine::removed_quantity);
                let removed_state = LineState::Removed {
                    removed: removed_before + 1,
                    original_quantity: quantity + removed_before,
                };

                let removed_idx = match self.position_of(&product_id, LineKind::Removed) {
                    Some(removed_idx) => {
                        self.lines[removed_idx].set_state(removed_state);
                        removed_idx
                    }
                    None => {
                        let line = OrderLine::new(self.lines[idx].product.clone(), removed_state);
                        self.lines.insert(idx + 1, line);
                        idx + 1
                    }
                };

                if quantity <= 1 {
                    // The removed line takes over the server rows
                    let ids = std::mem::take(&mut self.lines[idx].server_item_ids);
                    self.lines[removed_idx].server_item_ids.extend(ids);
                    self.lines.remove(idx);
                } else {
                    self.lines[idx].set_state(LineState::Original {
                        quantity: quantity - 1,
                    });
                }
                Ok(())
            }
            LineState::Removed { .. } => Err(OrderError::LineNotEditable(local_id.clone())),
        }
    }

    /// Restore a removed line: its quantity goes back onto the original line
    /// (recreated if it was fully removed) and the removed line disappears.
    pub fn restore(&mut self, local_id: &LocalId) -> OrderResult<LocalId> {
        let idx = self.position(local_id)?;
        let LineState::Removed { removed, .. } = self.lines[idx].state else {
            return Err(OrderError::LineNotRestorable(local_id.clone()));
        };

        let mut removed_line = self.lines.remove(idx);
        match self.position_of(&removed_line.product.id, LineKind::Original) {
            Some(original_idx) => {
                let original = &mut self.lines[original_idx];
                let quantity = original.quantity() + removed;
                original.set_state(LineState::Original { quantity });
                original.server_item_ids.extend(removed_line.server_item_ids);
                Ok(original.local_id.clone())
            }
            None => {
                removed_line.set_state(LineState::Original { quantity: removed });
                let restored_id = removed_line.local_id.clone();
                self.lines.insert(idx, removed_line);
                Ok(restored_id)
            }
        }
    }

    /// Promote unsent lines to original once the backend accepted them.
    ///
    /// Addon quantity merges into the product's original line, and the
    /// promoted lines become the synced baseline.
    pub(crate) fn promote_unsent(&mut self) {
        let mut idx = 0;
        while idx < self.lines.len() {
            let kind = self.lines[idx].kind();
            if !matches!(kind, LineKind::Draft | LineKind::Addon) {
                idx += 1;
                continue;
            }
            let quantity = self.lines[idx].quantity();
            let product_id = self.lines[idx].product_id().to_string();
            match self.position_of(&product_id, LineKind::Original) {
                Some(original_idx) => {
                    let total = self.lines[original_idx].quantity() + quantity;
                    self.lines[original_idx].set_state(LineState::Original { quantity: total });
                    self.lines.remove(idx);
                }
                None => {
                    self.lines[idx].set_state(LineState::Original { quantity });
                    idx += 1;
                }
            }
        }

        let synced = self
            .lines
            .iter()
            .map(|l| {
                let product_id = l.product_id();
                (product_id.to_string(), self.current_quantities(product_id))
            })
            .collect();
        self.synced = synced;
    }

    /// Attach the draft to a freshly created bill
    pub(crate) fn attach_bill(&mut self, bill: BillRef) {
        self.bill = Some(bill);
    }

    /// Drop lines and bill; the table selection stays
    pub fn clear(&mut self) {
        self.bill = None;
        self.lines.clear();
        self.synced.clear();
    }
}

fn unsent_state(kind: LineKind, quantity: u32) -> LineState {
    match kind {
        LineKind::Addon => LineState::Addon { quantity },
        _ => LineState::Draft { quantity },
    }
}
