//! Typed backend API
//!
//! One method per backend operation. Paths are fixed by the backend.

use shared::client::{
    BillNumberUpdate, BillStatusUpdate, CategoryQuery, ProductQuery, ProductsResponse,
    TableStatus, TableStatusRequest,
};
use shared::models::{Bill, BillNumber, BillStatus, CatalogStatus, Category, Product, TaxSettings};

use crate::error::ClientResult;
use crate::http::HttpClient;

pub const CATEGORY_STATUS_PATH: &str = "/api/category/status";
pub const PRODUCT_ALL_PATH: &str = "/api/product/all";
pub const TABLE_STATUS_PATH: &str = "/api/bill/getTableStatus";
pub const BILL_CREATE_PATH: &str = "/api/bill/create";
pub const BILL_UPDATE_PATH: &str = "/api/bill/update";
pub const BILL_UPDATE_STATUS_PATH: &str = "/api/bill/updateStatus";
pub const BILL_NUMBER_GET_PATH: &str = "/api/billnumber/getBillNumber";
pub const BILL_NUMBER_UPDATE_PATH: &str = "/api/billnumber/updateBillNumber";
pub const TAX_SETTINGS_PATH: &str = "/api/tax/tax-get-settings";

/// Backend API over any [`HttpClient`]
#[derive(Debug, Clone)]
pub struct BackendApi<C> {
    http: C,
}

impl<C: HttpClient> BackendApi<C> {
    pub fn new(http: C) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    // ========== Catalog API ==========

    pub async fn categories(&self, statuses: &[CatalogStatus]) -> ClientResult<Vec<Category>> {
        let query = CategoryQuery {
            statuses: statuses.to_vec(),
        };
        self.http.post(CATEGORY_STATUS_PATH, &query).await
    }

    pub async fn products(
        &self,
        statuses: &[CatalogStatus],
        category_statuses: &[CatalogStatus],
    ) -> ClientResult<Vec<Product>> {
        let query = ProductQuery {
            status: statuses.to_vec(),
            category_status: category_statuses.to_vec(),
        };
        let response: ProductsResponse = self.http.post(PRODUCT_ALL_PATH, &query).await?;
        Ok(response.data.products)
    }

    // ========== Bill API ==========

    pub async fn table_status(&self, table_number: u32) -> ClientResult<TableStatus> {
        self.http
            .post(TABLE_STATUS_PATH, &TableStatusRequest { table_number })
            .await
    }

    /// Create a bill; returns whatever the backend echoed back
    pub async fn create_bill(&self, bill: &Bill) -> ClientResult<Option<serde_json::Value>> {
        self.http.post(BILL_CREATE_PATH, bill).await
    }

    pub async fn update_bill(&self, bill: &Bill) -> ClientResult<Option<serde_json::Value>> {
        self.http.put(BILL_UPDATE_PATH, bill).await
    }

    pub async fn update_bill_status(&self, bill_id: &str, status: BillStatus) -> ClientResult<()> {
        let body = BillStatusUpdate {
            id: bill_id.to_string(),
            status,
        };
        let _: Option<serde_json::Value> = self.http.put(BILL_UPDATE_STATUS_PATH, &body).await?;
        Ok(())
    }

    // ========== Bill number API ==========

    pub async fn current_bill_number(&self) -> ClientResult<BillNumber> {
        self.http.get(BILL_NUMBER_GET_PATH).await
    }

    pub async fn advance_bill_number(&self, next: i64) -> ClientResult<()> {
        let _: Option<serde_json::Value> = self
            .http
            .put(BILL_NUMBER_UPDATE_PATH, &BillNumberUpdate { number: next })
            .await?;
        Ok(())
    }

    /// Fetch the current bill number, then advance the sequence by one.
    ///
    /// Two sequential calls with no client-side lock; uniqueness is the
    /// backend's job.
    pub async fn reserve_bill_number(&self) -> ClientResult<BillNumber> {
        let current = self.current_bill_number().await?;
        self.advance_bill_number(current.number + 1).await?;
        tracing::debug!(
            bill_number = %current.current_bill_number,
            sequence = current.number,
            "Bill number reserved"
        );
        Ok(current)
    }

    // ========== Tax API ==========

    pub async fn tax_settings(&self) -> ClientResult<TaxSettings> {
        self.http.get(TAX_SETTINGS_PATH).await
    }
}
