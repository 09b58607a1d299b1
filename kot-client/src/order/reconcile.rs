//! Reconciliation between the backend bill and the local draft
//!
//! - [`sync`]: server → draft. Pure and idempotent; the server is ground
//!   truth and whichever sync lands last wins.
//! - [`diff`]: draft → server. Computes the full item list to send on
//!   "Update KOT", appending audit records to every row it touches.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use shared::models::{Bill, BillItem, BillStatus, ChangeType, ItemStatus, ItemUpdate, Product};

use super::draft::{BillRef, OrderDraft, SyncedQuantities};
use super::line::{LineState, OrderLine};

// =============================================================================
// Sync (server → draft)
// =============================================================================

/// Rows of one product on the server bill
#[derive(Debug)]
struct ProductRows {
    product: Product,
    active_quantity: u32,
    active_ids: Vec<String>,
    canceled_quantity: u32,
    canceled_ids: Vec<String>,
}

/// Group bill items by product, keeping first-appearance order
fn group_by_product(items: &[BillItem]) -> Vec<ProductRows> {
    let mut groups: Vec<ProductRows> = Vec::new();
    for item in items {
        let idx = match groups.iter().position(|g| g.product.id == item.product.id) {
            Some(idx) => idx,
            None => {
                let mut product = item.product.clone();
                // The row price stands in for a product snapshot without one
                if product.price.is_none() {
                    product.price = Some(item.price);
                }
                groups.push(ProductRows {
                    product,
                    active_quantity: 0,
                    active_ids: Vec::new(),
                    canceled_quantity: 0,
                    canceled_ids: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[idx];
        if item.is_active() {
            group.active_quantity += item.quantity;
            group.active_ids.extend(item.id.clone());
        } else if item.is_canceled() {
            group.canceled_quantity += item.quantity;
            group.canceled_ids.extend(item.id.clone());
        }
    }
    groups
}

/// Build the draft mirroring the table's bill.
///
/// All active rows of a product collapse into one original line and all
/// canceled rows into one removed line. A missing bill, or one that is not
/// pending/preparing/ready, yields an empty draft: the table is free.
pub fn sync(table: u32, bill: Option<&Bill>) -> OrderDraft {
    let Some(bill) = bill.filter(|b| b.is_open()) else {
        return OrderDraft::for_table(table);
    };

    let mut lines = Vec::new();
    let mut synced = BTreeMap::new();

    for group in group_by_product(&bill.items) {
        if group.active_quantity == 0 && group.canceled_quantity == 0 {
            continue;
        }

        if group.active_quantity > 0 {
            lines.push(
                OrderLine::new(
                    group.product.clone(),
                    LineState::Original {
                        quantity: group.active_quantity,
                    },
                )
                .with_server_ids(group.active_ids),
            );
        }
        if group.canceled_quantity > 0 {
            lines.push(
                OrderLine::new(
                    group.product.clone(),
                    LineState::Removed {
                        removed: group.canceled_quantity,
                        original_quantity: group.canceled_quantity,
                    },
                )
                .with_server_ids(group.canceled_ids),
            );
        }

        synced.insert(
            group.product.id.clone(),
            SyncedQuantities {
                original: group.active_quantity,
                removed: group.canceled_quantity,
            },
        );
    }

    tracing::debug!(
        table,
        bill_id = bill.id.as_deref().unwrap_or_default(),
        lines = lines.len(),
        "Draft synced from bill"
    );

    OrderDraft::from_synced(
        table,
        BillRef {
            id: bill.id.clone(),
            bill_number: bill.bill_number.clone(),
            status: bill.status,
        },
        lines,
        synced,
    )
}

// =============================================================================
// Diff (draft → server)
// =============================================================================

/// One change the diff makes to the server's items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemChange {
    /// Backend row id; `None` for new rows
    pub item_id: Option<String>,
    pub product_id: String,
    pub change_type: ChangeType,
    /// Magnitude of the change
    pub quantity: u32,
}

/// Result of diffing a draft against the server bill
#[derive(Debug, Clone, PartialEq)]
pub struct BillDiff {
    /// Full item list to send: existing rows (edited or not) then new rows
    pub items: Vec<BillItem>,
    pub changes: Vec<ItemChange>,
    /// Bill status to send
    pub status: BillStatus,
}

impl BillDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Edits and cancellations of existing rows
    pub fn edits(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.change_type != ChangeType::Add)
            .count()
    }

    pub fn additions(&self) -> usize {
        self.changes
            .iter()
            .filter(|c| c.change_type == ChangeType::Add)
            .count()
    }
}

/// Compute the edits that converge `server` to the draft's intent.
///
/// Desired quantity per product is spread greedily over the product's
/// active rows in their existing order; rows that shrink are edited, rows
/// that drop to zero are canceled (keeping their quantity as the canceled
/// amount). Whatever the rows cannot supply becomes one new row. Each
/// touched row gets an audit record appended; existing records are never
/// rewritten. Rows keep their own price. Products the draft has never seen
/// are left alone.
///
/// An empty diff finalizes the bill (`bill-printed`); otherwise the
/// server's status is kept.
pub fn diff(draft: &OrderDraft, server: &Bill, actor: &str, now: DateTime<Utc>) -> BillDiff {
    let mut items = server.items.clone();
    let mut changes = Vec::new();
    let mut new_items = Vec::new();

    for (product_id, desired) in draft.desired_quantities() {
        let mut remaining = desired;

        for item in items
            .iter_mut()
            .filter(|i| i.is_active() && i.product.id == product_id)
        {
            let assigned = item.quantity.min(remaining);
            remaining -= assigned;
            if assigned == item.quantity {
                continue;
            }

            let (change_type, magnitude) = if assigned > 0 {
                let delta = item.quantity - assigned;
                item.quantity = assigned;
                (ChangeType::Edit, delta)
            } else {
                item.status = ItemStatus::Canceled;
                (ChangeType::Canceled, item.quantity)
            };

            item.updates.push(ItemUpdate {
                change_type,
                quantity: magnitude,
                timestamp: now,
                actor: actor.to_string(),
            });
            changes.push(ItemChange {
                item_id: item.id.clone(),
                product_id: product_id.clone(),
                change_type,
                quantity: magnitude,
            });
        }

        if remaining == 0 {
            continue;
        }
        let Some(product) = draft.product(&product_id) else {
            tracing::warn!(product_id = %product_id, "No product snapshot for new quantity, skipped");
            continue;
        };
        new_items.push(new_bill_item(product, remaining, actor, now));
        changes.push(ItemChange {
            item_id: None,
            product_id,
            change_type: ChangeType::Add,
            quantity: remaining,
        });
    }

    items.extend(new_items);

    let status = if changes.is_empty() {
        BillStatus::BillPrinted
    } else {
        server.status
    };

    BillDiff {
        items,
        changes,
        status,
    }
}

/// A new bill row carrying its initial `add` audit record
pub(crate) fn new_bill_item(
    product: &Product,
    quantity: u32,
    actor: &str,
    now: DateTime<Utc>,
) -> BillItem {
    BillItem {
        id: None,
        product: product.clone(),
        quantity,
        price: product.unit_price(),
        status: ItemStatus::Active,
        updates: vec![ItemUpdate {
            change_type: ChangeType::Add,
            quantity,
            timestamp: now,
            actor: actor.to_string(),
        }],
    }
}
