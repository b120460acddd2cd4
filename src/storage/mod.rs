use crate::domain::{DashboardStats, Item, ItemChanges, NewItem};
use crate::error::Result;
use crate::query::{ItemPage, ItemQuery};
use async_trait::async_trait;

pub mod database;
pub mod rows;

pub use database::DatabaseStorage;

/// Stock views offered by the inventory listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockFilter {
    /// Active items with quantity > 0.
    InStock,
    /// Active items with quantity = 0.
    OutOfStock,
    /// Active items with 0 < quantity <= min stock level.
    LowStock,
}

/// Item persistence used by the HTTP handlers.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list_items(&self, query: &ItemQuery) -> Result<ItemPage>;
    async fn get_item(&self, id: i64) -> Result<Option<Item>>;

    async fn create_item(&self, item: &NewItem) -> Result<Item>;
    async fn update_item(&self, id: i64, changes: &ItemChanges) -> Result<Option<Item>>;
    /// Soft delete: flips the active flag, never removes the row.
    async fn deactivate_item(&self, id: i64) -> Result<Option<Item>>;

    /// Active items at or below their minimum stock level, most short first.
    async fn low_stock_alerts(&self) -> Result<Vec<Item>>;
    async fn stock_listing(&self, filter: StockFilter) -> Result<Vec<Item>>;
    async fn dashboard_stats(&self) -> Result<DashboardStats>;
}
