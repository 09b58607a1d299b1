//! Bill lifecycle controller
//!
//! Drives one table's bill through free → open → free. Local guards run
//! before any network call; the draft is only changed after the backend
//! confirmed an operation, and every confirmed write ends with a re-sync
//! from the server.
//!
//! Operations are not serialized against each other. Two in-flight
//! operations on the same table can interleave; whichever sync lands last
//! wins, which is safe because [`sync`] is an idempotent overwrite.

use shared::models::{Bill, BillNumber, BillStatus, TaxSettings};
use shared::util::now_utc;

use super::draft::{BillRef, OrderDraft};
use super::error::{OrderError, OrderResult};
use super::line::LocalId;
use super::pricing::{self, Totals};
use super::reconcile::{diff, new_bill_item, sync};
use crate::api::BackendApi;
use crate::catalog::Catalog;
use crate::error::ClientResult;
use crate::http::HttpClient;

/// Result of "Update KOT"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing pending since the last sync; no request was sent
    Unchanged,
    Updated {
        edits: usize,
        additions: usize,
        /// Status sent with the update
        status: BillStatus,
    },
}

/// Result of "Cancel"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The backend bill was cancelled
    Cancelled,
    /// No bill existed; only the local draft was discarded
    Cleared,
}

/// Order screen state for one terminal
#[derive(Debug)]
pub struct OrderSession<C> {
    api: BackendApi<C>,
    catalog: Catalog,
    draft: OrderDraft,
    /// Fetched once, on first need
    tax: Option<TaxSettings>,
    /// Bill number fetched and advanced but not yet used by a created bill
    reserved_bill_number: Option<BillNumber>,
    /// Name recorded on item audit entries
    actor: String,
}

impl<C: HttpClient> OrderSession<C> {
    pub fn new(api: BackendApi<C>, actor: impl Into<String>) -> Self {
        Self {
            api,
            catalog: Catalog::new(),
            draft: OrderDraft::new(),
            tax: None,
            reserved_bill_number: None,
            actor: actor.into(),
        }
    }

    // ========== Accessors ==========

    pub fn api(&self) -> &BackendApi<C> {
        &self.api
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn tax_settings(&self) -> Option<&TaxSettings> {
        self.tax.as_ref()
    }

    pub fn reserved_bill_number(&self) -> Option<&BillNumber> {
        self.reserved_bill_number.as_ref()
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Totals of the current draft (zero tax until settings are loaded)
    pub fn totals(&self) -> Totals {
        let tax = self.tax.clone().unwrap_or_default();
        pricing::draft_totals(&self.draft, &tax)
    }

    /// Whether "Update KOT" would send anything
    pub fn has_pending_changes(&self) -> bool {
        self.draft.has_pending_changes()
    }

    // ========== Loading ==========

    pub async fn refresh_catalog(&mut self) -> ClientResult<()> {
        self.catalog.refresh(&self.api).await
    }

    /// Fetch tax settings unless already loaded
    pub async fn load_tax_settings(&mut self) -> ClientResult<&TaxSettings> {
        if self.tax.is_none() {
            let tax = self.api.tax_settings().await?;
            tracing::debug!(sgst = tax.sgst, cgst = tax.cgst, "Tax settings loaded");
            self.tax = Some(tax);
        }
        Ok(self.tax.get_or_insert_with(TaxSettings::default))
    }

    /// Select a table and load its bill
    pub async fn open_table(&mut self, table: u32) -> OrderResult<()> {
        if self.draft.table() != Some(table) {
            self.draft = OrderDraft::for_table(table);
        }
        self.resync().await
    }

    /// Replace the draft with the server's view of the selected table.
    ///
    /// Local edits that were not sent are discarded.
    pub async fn resync(&mut self) -> OrderResult<()> {
        let table = self.draft.table().ok_or(OrderError::NoTableSelected)?;
        let status = self.api.table_status(table).await?;
        self.draft = sync(table, status.open_bill());
        Ok(())
    }

    /// Screen became active again: reload the catalog and re-sync the
    /// selected table, if any. A catalog failure does not stop the re-sync.
    pub async fn on_focus(&mut self) -> OrderResult<()> {
        let catalog = self.refresh_catalog().await;
        if let Err(e) = &catalog {
            tracing::warn!(error = %e, "Catalog refresh on focus failed");
        }
        if self.draft.table().is_some() {
            self.resync().await?;
        }
        catalog.map_err(OrderError::from)
    }

    // ========== Draft edits (local only) ==========

    /// Add one unit of a catalog product
    pub fn add_product(&mut self, product_id: &str) -> OrderResult<LocalId> {
        let product = self
            .catalog
            .product(product_id)
            .ok_or_else(|| OrderError::ProductNotFound(product_id.to_string()))?;
        Ok(self.draft.add_product(product))
    }

    pub fn increment(&mut self, local_id: &LocalId) -> OrderResult<LocalId> {
        self.draft.increment(local_id)
    }

    pub fn decrement(&mut self, local_id: &LocalId) -> OrderResult<()> {
        self.draft.decrement(local_id)
    }

    pub fn restore(&mut self, local_id: &LocalId) -> OrderResult<LocalId> {
        self.draft.restore(local_id)
    }

    // ========== Lifecycle ==========

    /// Send the draft to the kitchen as a new bill.
    ///
    /// Rejected with [`OrderError::TableOccupied`] when the table already
    /// has an open bill, locally or on the server.
    pub async fn submit_kot(&mut self) -> OrderResult<BillRef> {
        let table = self.require_orderable()?;
        if self.draft.is_submitted() {
            return Err(OrderError::TableOccupied { table });
        }

        let status = self.api.table_status(table).await?;
        if status.open_bill().is_some() {
            tracing::warn!(table, "Submit rejected, table already has an open bill");
            return Err(OrderError::TableOccupied { table });
        }

        let bill = self.create_bill(table, BillStatus::Pending).await?;
        tracing::info!(target: "audit", table, bill_number = %bill.bill_number, "KOT submitted");

        self.draft.attach_bill(bill.clone());
        self.draft.promote_unsent();
        self.resync_after_write(table).await;
        Ok(bill)
    }

    /// Send the draft's edits against the server's current bill.
    pub async fn update_kot(&mut self) -> OrderResult<UpdateOutcome> {
        let table = self.draft.table().ok_or(OrderError::NoTableSelected)?;
        if self.draft.bill_id().is_none() {
            return Err(OrderError::NoActiveBill);
        }
        if !self.draft.has_pending_changes() {
            tracing::debug!(table, "Update skipped, no pending changes");
            return Ok(UpdateOutcome::Unchanged);
        }

        let status = self.api.table_status(table).await?;
        let Some(server) = status.into_open_bill() else {
            tracing::warn!(table, "Update rejected, bill is no longer open");
            return Err(OrderError::NoActiveBill);
        };

        let changes = diff(&self.draft, &server, &self.actor, now_utc());
        let tax = self.load_tax_settings().await?.clone();
        let totals = pricing::item_totals(&changes.items, &tax);

        let mut payload = server;
        payload.items = changes.items.clone();
        payload.status = changes.status;
        totals.apply_to(&mut payload, &tax);

        self.api.update_bill(&payload).await?;

        let outcome = UpdateOutcome::Updated {
            edits: changes.edits(),
            additions: changes.additions(),
            status: changes.status,
        };
        tracing::info!(
            target: "audit",
            table,
            bill_number = %payload.bill_number,
            edits = changes.edits(),
            additions = changes.additions(),
            status = ?changes.status,
            "KOT updated"
        );

        self.draft.promote_unsent();
        self.resync_after_write(table).await;
        Ok(outcome)
    }

    /// Cancel the table's bill, or discard the draft when there is none.
    ///
    /// A submitted draft whose bill id is unknown is left alone with
    /// [`OrderError::NoActiveBill`]. Asking the user for confirmation is the
    /// caller's job.
    pub async fn cancel(&mut self) -> OrderResult<CancelOutcome> {
        let Some(bill_id) = self.draft.bill_id().map(str::to_string) else {
            if self.draft.is_submitted() {
                return Err(OrderError::NoActiveBill);
            }
            self.clear();
            return Ok(CancelOutcome::Cleared);
        };

        self.api
            .update_bill_status(&bill_id, BillStatus::Cancelled)
            .await?;
        tracing::info!(target: "audit", table = ?self.draft.table(), bill_id = %bill_id, "Bill cancelled");
        self.clear();
        Ok(CancelOutcome::Cancelled)
    }

    /// Close the table's bill.
    ///
    /// An existing bill is marked completed; without one, a bill is created
    /// directly in `completed` status. The draft is cleared either way.
    pub async fn complete(&mut self) -> OrderResult<()> {
        let table = self.require_orderable()?;

        let bill_id = self.draft.bill_id().map(str::to_string);
        match (self.draft.is_submitted(), bill_id) {
            (true, Some(bill_id)) => {
                self.api
                    .update_bill_status(&bill_id, BillStatus::Completed)
                    .await?;
                tracing::info!(target: "audit", table, bill_id = %bill_id, "Bill completed");
            }
            (true, None) => return Err(OrderError::NoActiveBill),
            (false, _) => {
                let bill = self.create_bill(table, BillStatus::Completed).await?;
                tracing::info!(
                    target: "audit",
                    table,
                    bill_number = %bill.bill_number,
                    "Bill created as completed"
                );
            }
        }

        self.clear();
        Ok(())
    }

    /// Discard the draft and any reserved bill number; the table stays selected
    pub fn clear(&mut self) {
        self.draft.clear();
        self.reserved_bill_number = None;
    }

    // ========== Internals ==========

    fn require_orderable(&self) -> OrderResult<u32> {
        let table = self.draft.table().ok_or(OrderError::NoTableSelected)?;
        if self.draft.is_empty() {
            return Err(OrderError::EmptyDraft);
        }
        Ok(table)
    }

    /// Reuse the reserved bill number, or reserve a new one
    async fn bill_number(&mut self) -> OrderResult<BillNumber> {
        if let Some(reserved) = &self.reserved_bill_number {
            return Ok(reserved.clone());
        }
        let reserved = self.api.reserve_bill_number().await?;
        if !reserved.is_usable() {
            return Err(OrderError::MissingBillNumber);
        }
        self.reserved_bill_number = Some(reserved.clone());
        Ok(reserved)
    }

    /// Create a bill from the draft's billable lines
    async fn create_bill(&mut self, table: u32, status: BillStatus) -> OrderResult<BillRef> {
        let number = self.bill_number().await?;
        let tax = self.load_tax_settings().await?.clone();

        let now = now_utc();
        let items: Vec<_> = self
            .draft
            .lines()
            .iter()
            .filter(|line| line.quantity() > 0)
            .map(|line| new_bill_item(line.product(), line.quantity(), &self.actor, now))
            .collect();

        let mut bill = Bill {
            bill_number: number.current_bill_number.clone(),
            number: number.number,
            status,
            table_number: table,
            items,
            ..Default::default()
        };
        pricing::item_totals(&bill.items, &tax).apply_to(&mut bill, &tax);

        let response = self.api.create_bill(&bill).await?;
        self.reserved_bill_number = None;

        Ok(BillRef {
            id: response.as_ref().and_then(created_bill_id),
            bill_number: bill.bill_number,
            status,
        })
    }

    /// Re-sync after a confirmed write. The write already succeeded, so a
    /// failure here is logged and the next focus re-sync catches up.
    async fn resync_after_write(&mut self, table: u32) {
        match self.api.table_status(table).await {
            Ok(status) => self.draft = sync(table, status.open_bill()),
            Err(e) => tracing::warn!(table, error = %e, "Re-sync after write failed"),
        }
    }
}

/// Bill id from a create response: the bill itself or `{data: bill}`
fn created_bill_id(response: &serde_json::Value) -> Option<String> {
    let bill = response
        .get("data")
        .filter(|data| data.is_object())
        .unwrap_or(response);
    bill.get("_id")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests;
