//! Catalog cache
//!
//! Categories and products fetched from the backend, plus the category
//! filter the order screen shows. Filtering is recomputed on demand from
//! the current product list; it never goes stale.

use shared::models::{CatalogStatus, Category, Product};

use crate::api::BackendApi;
use crate::error::ClientResult;
use crate::http::HttpClient;

/// Cached catalog for the order screen
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    products: Vec<Product>,
    selected_category: Option<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from already-fetched data
    pub fn with_data(categories: Vec<Category>, products: Vec<Product>) -> Self {
        Self {
            categories,
            products,
            selected_category: None,
        }
    }

    /// Fetch active categories from the backend and replace the cached ones.
    ///
    /// On failure the previous categories are kept.
    pub async fn load_categories<C: HttpClient>(&mut self, api: &BackendApi<C>) -> ClientResult<()> {
        let categories = api.categories(&[CatalogStatus::Active]).await?;
        tracing::debug!(count = categories.len(), "Categories loaded");
        self.categories = categories;
        Ok(())
    }

    /// Fetch active products of active categories and replace the cached ones.
    ///
    /// On failure the previous products are kept.
    pub async fn load_products<C: HttpClient>(&mut self, api: &BackendApi<C>) -> ClientResult<()> {
        let products = api
            .products(&[CatalogStatus::Active], &[CatalogStatus::Active])
            .await?;
        tracing::debug!(count = products.len(), "Products loaded");
        self.products = products;
        Ok(())
    }

    /// Reload both lists. Both loads are attempted; the first error is returned.
    pub async fn refresh<C: HttpClient>(&mut self, api: &BackendApi<C>) -> ClientResult<()> {
        let categories = self.load_categories(api).await;
        let products = self.load_products(api).await;
        categories.and(products)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Products of one category, in catalog order
    pub fn filter_by_category(&self, category_id: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.belongs_to(category_id))
            .collect()
    }

    pub fn select_category(&mut self, category_id: Option<String>) {
        self.selected_category = category_id;
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// Products for the current selection (all products when none is selected)
    pub fn visible(&self) -> Vec<&Product> {
        match self.selected_category.as_deref() {
            Some(category_id) => self.filter_by_category(category_id),
            None => self.products.iter().collect(),
        }
    }
}
