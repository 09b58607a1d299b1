use super::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use shared::client::{BillNumberUpdate, BillStatusUpdate, TableStatusRequest};
use shared::models::{BillItem, CatalogStatus, Category, CategoryRef, ItemStatus, Product};

use crate::api::{
    BILL_CREATE_PATH, BILL_NUMBER_GET_PATH, BILL_NUMBER_UPDATE_PATH, BILL_UPDATE_PATH,
    BILL_UPDATE_STATUS_PATH, CATEGORY_STATUS_PATH, PRODUCT_ALL_PATH, TABLE_STATUS_PATH,
    TAX_SETTINGS_PATH,
};
use crate::http_oneshot::OneshotHttpClient;
use crate::order::draft::TableState;
use crate::order::line::LineKind;
use crate::session::{MemorySessionStore, SessionStore};

const TOKEN: &str = "token-1";
const ACTOR: &str = "waiter-1";

// ========================================================================
// Fake backend
// ========================================================================

#[derive(Debug)]
struct BackendState {
    categories: Vec<Category>,
    products: Vec<Product>,
    bills: Vec<Bill>,
    bill_number: BillNumber,
    tax: TaxSettings,
    /// Token the backend accepts; `None` rejects everything with 401
    valid_token: Option<String>,
    /// Forced failures by path: status and error message
    failures: HashMap<&'static str, (StatusCode, String)>,
    /// Paths requested, in order
    requests: Vec<&'static str>,
    /// Leave `_id` out of bill responses
    hide_bill_ids: bool,
    next_id: u32,
}

impl BackendState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn assign_item_ids(&mut self, items: &mut [BillItem]) {
        for item in items.iter_mut().filter(|i| i.id.is_none()) {
            item.id = Some(self.next_id("item"));
        }
    }
}

/// In-memory restaurant backend serving the bill API over an axum Router
#[derive(Debug, Clone)]
struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    fn new() -> Self {
        let category = |id: &str, name: &str| Category {
            id: id.to_string(),
            name: name.to_string(),
            status: CatalogStatus::Active,
        };
        let state = BackendState {
            categories: vec![category("c1", "Starters"), category("c2", "Drinks")],
            products: vec![
                product("a", "Paneer Tikka", "c1", Some(50.0)),
                product("b", "Veg Soup", "c1", Some(30.0)),
                product("c", "Lassi", "c2", Some(25.0)),
            ],
            bills: Vec::new(),
            bill_number: BillNumber {
                current_bill_number: "INV-100".to_string(),
                number: 100,
            },
            tax: TaxSettings {
                cgst: 2.5,
                sgst: 2.5,
                fssai_number: Some("10020042006754".to_string()),
            },
            valid_token: Some(TOKEN.to_string()),
            failures: HashMap::new(),
            requests: Vec::new(),
            hide_bill_ids: false,
            next_id: 0,
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    fn router(&self) -> Router {
        Router::new()
            .route(CATEGORY_STATUS_PATH, post(categories))
            .route(PRODUCT_ALL_PATH, post(products))
            .route(TABLE_STATUS_PATH, post(table_status))
            .route(BILL_CREATE_PATH, post(create_bill))
            .route(BILL_UPDATE_PATH, put(update_bill))
            .route(BILL_UPDATE_STATUS_PATH, put(update_bill_status))
            .route(BILL_NUMBER_GET_PATH, get(get_bill_number))
            .route(BILL_NUMBER_UPDATE_PATH, put(update_bill_number))
            .route(TAX_SETTINGS_PATH, get(tax_settings))
            .with_state(self.clone())
    }

    /// Log the request and apply auth and forced failures
    fn gate(
        &self,
        path: &'static str,
        headers: &HeaderMap,
    ) -> Result<MutexGuard<'_, BackendState>, Response> {
        let mut state = self.lock();
        state.requests.push(path);

        let bearer = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if state.valid_token.is_none() || bearer != state.valid_token.as_deref() {
            return Err((StatusCode::UNAUTHORIZED, Json(json!({"message": "jwt expired"})))
                .into_response());
        }
        if let Some((status, message)) = state.failures.get(path) {
            return Err((*status, Json(json!({"message": message}))).into_response());
        }
        Ok(state)
    }

    // ---- test controls ----

    fn fail(&self, path: &'static str, status: StatusCode, message: &str) {
        self.lock().failures.insert(path, (status, message.to_string()));
    }

    fn recover(&self, path: &'static str) {
        self.lock().failures.remove(path);
    }

    fn expire_token(&self) {
        self.lock().valid_token = None;
    }

    fn hide_bill_ids(&self) {
        self.lock().hide_bill_ids = true;
    }

    fn seed_bill(&self, mut bill: Bill) -> String {
        let mut state = self.lock();
        let id = state.next_id("bill");
        bill.id = Some(id.clone());
        state.assign_item_ids(&mut bill.items);
        state.bills.push(bill);
        id
    }

    /// Latest bill for a table
    fn bill_for_table(&self, table: u32) -> Option<Bill> {
        self.lock()
            .bills
            .iter()
            .rev()
            .find(|b| b.table_number == table)
            .cloned()
    }

    fn edit_bill(&self, table: u32, edit: impl FnOnce(&mut Bill)) {
        let mut state = self.lock();
        let bill = state
            .bills
            .iter_mut()
            .rev()
            .find(|b| b.table_number == table)
            .unwrap();
        edit(bill);
    }

    fn requests(&self) -> Vec<&'static str> {
        self.lock().requests.clone()
    }

    fn request_count(&self, path: &str) -> usize {
        self.lock().requests.iter().filter(|p| **p == path).count()
    }

    fn bill_count(&self) -> usize {
        self.lock().bills.len()
    }

    fn bill_sequence(&self) -> i64 {
        self.lock().bill_number.number
    }
}

async fn categories(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    match backend.gate(CATEGORY_STATUS_PATH, &headers) {
        Ok(state) => Json(state.categories.clone()).into_response(),
        Err(response) => response,
    }
}

async fn products(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    match backend.gate(PRODUCT_ALL_PATH, &headers) {
        Ok(state) => Json(json!({"data": {"products": state.products}})).into_response(),
        Err(response) => response,
    }
}

async fn table_status(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(request): Json<TableStatusRequest>,
) -> Response {
    let state = match backend.gate(TABLE_STATUS_PATH, &headers) {
        Ok(state) => state,
        Err(response) => return response,
    };
    let bill = state
        .bills
        .iter()
        .rev()
        .find(|b| b.table_number == request.table_number);
    match bill.cloned() {
        Some(mut bill) => {
            if state.hide_bill_ids {
                bill.id = None;
            }
            Json(json!({"status": "success", "data": bill})).into_response()
        }
        None => Json(json!({"status": "table-free"})).into_response(),
    }
}

async fn create_bill(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(mut bill): Json<Bill>,
) -> Response {
    let mut state = match backend.gate(BILL_CREATE_PATH, &headers) {
        Ok(state) => state,
        Err(response) => return response,
    };
    let id = state.next_id("bill");
    bill.id = Some(id);
    state.assign_item_ids(&mut bill.items);
    state.bills.push(bill.clone());
    if state.hide_bill_ids {
        bill.id = None;
    }
    (StatusCode::CREATED, Json(bill)).into_response()
}

async fn update_bill(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(mut bill): Json<Bill>,
) -> Response {
    let mut state = match backend.gate(BILL_UPDATE_PATH, &headers) {
        Ok(state) => state,
        Err(response) => return response,
    };
    state.assign_item_ids(&mut bill.items);
    let Some(stored) = state.bills.iter_mut().find(|b| b.id == bill.id) else {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Bill not found"}))).into_response();
    };
    *stored = bill;
    Json(json!({"message": "Bill updated"})).into_response()
}

async fn update_bill_status(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(update): Json<BillStatusUpdate>,
) -> Response {
    let mut state = match backend.gate(BILL_UPDATE_STATUS_PATH, &headers) {
        Ok(state) => state,
        Err(response) => return response,
    };
    match state.bills.iter_mut().find(|b| b.id.as_deref() == Some(update.id.as_str())) {
        Some(bill) => {
            bill.status = update.status;
            Json(json!({"message": "Status updated"})).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Bill not found"}))).into_response(),
    }
}

async fn get_bill_number(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    match backend.gate(BILL_NUMBER_GET_PATH, &headers) {
        Ok(state) => Json(state.bill_number.clone()).into_response(),
        Err(response) => response,
    }
}

async fn update_bill_number(
    State(backend): State<FakeBackend>,
    headers: HeaderMap,
    Json(update): Json<BillNumberUpdate>,
) -> Response {
    let mut state = match backend.gate(BILL_NUMBER_UPDATE_PATH, &headers) {
        Ok(state) => state,
        Err(response) => return response,
    };
    state.bill_number = BillNumber {
        current_bill_number: format!("INV-{}", update.number),
        number: update.number,
    };
    StatusCode::NO_CONTENT.into_response()
}

async fn tax_settings(State(backend): State<FakeBackend>, headers: HeaderMap) -> Response {
    match backend.gate(TAX_SETTINGS_PATH, &headers) {
        Ok(state) => Json(state.tax.clone()).into_response(),
        Err(response) => response,
    }
}

// ========================================================================
// Helpers
// ========================================================================

fn product(id: &str, name: &str, category: &str, price: Option<f64>) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: CategoryRef {
            id: category.to_string(),
            name: String::new(),
        },
        status: CatalogStatus::Active,
        unit: "plate".to_string(),
        price,
    }
}

fn row(product_id: &str, quantity: u32, status: ItemStatus) -> BillItem {
    BillItem {
        id: None,
        product: product(product_id, product_id, "c1", Some(50.0)),
        quantity,
        price: 50.0,
        status,
        updates: vec![],
    }
}

fn server_bill(table: u32, status: BillStatus, items: Vec<BillItem>) -> Bill {
    Bill {
        bill_number: "INV-42".to_string(),
        number: 42,
        status,
        table_number: table,
        items,
        ..Default::default()
    }
}

fn new_session(backend: &FakeBackend) -> (OrderSession<OneshotHttpClient>, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new("local", Some(TOKEN.to_string())));
    let client = OneshotHttpClient::new(backend.router(), store.clone());
    (OrderSession::new(BackendApi::new(client), ACTOR), store)
}

/// Session with the catalog loaded and a table opened
async fn open_session(
    backend: &FakeBackend,
    table: u32,
) -> (OrderSession<OneshotHttpClient>, Arc<MemorySessionStore>) {
    let (mut session, store) = new_session(backend);
    session.refresh_catalog().await.unwrap();
    session.open_table(table).await.unwrap();
    (session, store)
}

fn local_id(session: &OrderSession<OneshotHttpClient>, product_id: &str, kind: LineKind) -> LocalId {
    session
        .draft()
        .find(product_id, kind)
        .unwrap_or_else(|| panic!("no {kind:?} line for {product_id}"))
        .local_id()
        .clone()
}

#[test]
fn test_created_bill_id_shapes() {
    assert_eq!(created_bill_id(&json!({"_id": "b1"})).as_deref(), Some("b1"));
    assert_eq!(
        created_bill_id(&json!({"message": "ok", "data": {"_id": "b2"}})).as_deref(),
        Some("b2")
    );
    assert_eq!(created_bill_id(&json!({"message": "ok"})), None);
}
