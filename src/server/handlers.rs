use super::requests::{ItemUpdateRequest, NewItemRequest};
use super::response::{ApiError, ApiResponse};
use super::AppState;
use crate::analytics::{self, DateRange};
use crate::domain::{DashboardStats, Item, Unit};
use crate::query::{ItemListParams, ItemPage, ItemQuery};
use crate::storage::StockFilter;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

type ApiResult<T> = std::result::Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// Items plus how many there are.
#[derive(Debug, Serialize)]
pub struct ItemList {
    pub items: Vec<Item>,
    pub count: usize,
}

impl From<Vec<Item>> for ItemList {
    fn from(items: Vec<Item>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAnalyticsParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::bad_request("Item ID must be a positive integer"))
}

fn item_not_found() -> ApiError {
    ApiError::not_found("Item not found")
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "justoo-inventory",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn list_items(
    State(state): State<AppState>,
    params: Result<Query<ItemListParams>, QueryRejection>,
) -> ApiResult<ItemPage> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let query = ItemQuery::from_params(&params, &state.config.pagination)
        .map_err(|e| ApiError::from_app(e, "Failed to retrieve items"))?;
    debug!(?query, "item list query");

    let page = state
        .store
        .list_items(&query)
        .await
        .map_err(|e| ApiError::from_app(e, "Failed to retrieve items"))?;

    Ok(ApiResponse::ok("Items retrieved successfully", page))
}

pub async fn get_item(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Item> {
    let id = parse_id(&id)?;
    let item = state
        .store
        .get_item(id)
        .await
        .map_err(|e| ApiError::from_app(e, "Failed to retrieve item"))?
        .ok_or_else(item_not_found)?;

    Ok(ApiResponse::ok("Item retrieved successfully", item))
}

pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<NewItemRequest>, JsonRejection>,
) -> ApiResult<Item> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let new_item = request
        .validate()
        .map_err(|e| ApiError::from_app(e, "Failed to add item"))?;

    let item = state
        .store
        .create_item(&new_item)
        .await
        .map_err(|e| ApiError::from_app(e, "Failed to add item"))?;

    Ok(ApiResponse::created("Item added successfully", item))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ItemUpdateRequest>, JsonRejection>,
) -> ApiResult<Item> {
    let id = parse_id(&id)?;
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let changes = request
        .validate()
        .map_err(|e| ApiError::from_app(e, "Failed to update item"))?;

    let item = state
        .store
        .update_item(id, &changes)
        .await
        .map_err(|e| ApiError::from_app(e, "Failed to update item"))?
        .ok_or_else(item_not_found)?;

    Ok(ApiResponse::ok("Item updated successfully", item))
}

/// Soft delete.
pub async fn delete_item(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Item> {
    let id = parse_id(&id)?;
    let item = state
        .store
        .deactivate_item(id)
        .await
        .map_err(|e| ApiError::from_app(e, "Failed to delete item"))?
        .ok_or_else(item_not_found)?;

    Ok(ApiResponse::ok("Item deleted successfully", item))
}

pub async fn list_units() -> ApiResult<Vec<&'static str>> {
    let units: Vec<&'static str> = Unit::ALL.iter().map(|u| u.as_str()).collect();
    Ok(ApiResponse::ok("Units retrieved successfully", units))
}

pub async fn inventory_analytics(
    State(state): State<AppState>,
) -> ApiResult<analytics::InventoryAnalytics> {
    let report = analytics::inventory_analytics(&state.db, &state.config.analytics)
        .await
        .map_err(|e| ApiError::from_app(e, "Failed to retrieve inventory analytics"))?;

    Ok(ApiResponse::ok(
        "Inventory analytics retrieved successfully",
        report,
    ))
}

pub async fn low_stock_alerts(State(state): State<AppState>) -> ApiResult<ItemList> {
    let items = state
        .store
        .low_stock_alerts()
        .await
        .map_err(|e| ApiError::from_app(e, "Failed to retrieve low stock alerts"))?;

    Ok(ApiResponse::ok(
        "Low stock alerts retrieved successfully",
        items.into(),
    ))
}

async fn stock_listing(state: AppState, filter: StockFilter, what: &str) -> ApiResult<ItemList> {
    let items = state
        .store
        .stock_listing(filter)
        .await
        .map_err(|e| ApiError::from_app(e, &format!("Failed to retrieve {what} items")))?;

    Ok(ApiResponse::ok(
        &format!("{} items retrieved successfully", capitalize(what)),
        items.into(),
    ))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub async fn in_stock_items(State(state): State<AppState>) -> ApiResult<ItemList> {
    stock_listing(state, StockFilter::InStock, "in-stock").await
}

pub async fn out_of_stock_items(State(state): State<AppState>) -> ApiResult<ItemList> {
    stock_listing(state, StockFilter::OutOfStock, "out-of-stock").await
}

pub async fn low_stock_items(State(state): State<AppState>) -> ApiResult<ItemList> {
    stock_listing(state, StockFilter::LowStock, "low-stock").await
}

pub async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let stats = state
        .store
        .dashboard_stats()
        .await
        .map_err(|e| ApiError::from_app(e, "Failed to retrieve dashboard stats"))?;

    Ok(ApiResponse::ok(
        "Dashboard stats retrieved successfully",
        stats,
    ))
}

pub async fn order_analytics(
    State(state): State<AppState>,
    params: Result<Query<OrderAnalyticsParams>, QueryRejection>,
) -> ApiResult<analytics::OrderAnalytics> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let range = DateRange::from_params(params.start_date.as_deref(), params.end_date.as_deref())
        .map_err(|e| ApiError::from_app(e, "Failed to retrieve order analytics"))?;

    let report =
        analytics::orders::order_analytics(&state.db, range, state.config.analytics.trend_days)
            .await
            .map_err(|e| ApiError::from_app(e, "Failed to retrieve order analytics"))?;

    Ok(ApiResponse::ok(
        "Order analytics retrieved successfully",
        report,
    ))
}

pub async fn payment_analytics(
    State(state): State<AppState>,
) -> ApiResult<analytics::PaymentAnalytics> {
    let report = analytics::payments::payment_analytics(&state.db)
        .await
        .map_err(|e| ApiError::from_app(e, "Failed to retrieve payment analytics"))?;

    Ok(ApiResponse::ok(
        "Payment analytics retrieved successfully",
        report,
    ))
}

pub async fn rider_statistics(
    State(state): State<AppState>,
) -> ApiResult<analytics::RiderStatistics> {
    let stats =
        analytics::riders::rider_statistics(&state.db, state.config.analytics.recent_rider_days)
            .await
            .map_err(|e| ApiError::from_app(e, "Failed to retrieve rider statistics"))?;

    Ok(ApiResponse::ok("Rider statistics retrieved successfully", stats))
}
