use crate::config::Config;
use crate::db::DatabaseManager;
use crate::metrics::track_requests;
use crate::storage::ItemStore;
use axum::{
    http::Method,
    middleware,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod handlers;
pub mod requests;
pub mod response;

/// Shared handles every handler receives.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ItemStore>,
    pub db: Arc<DatabaseManager>,
    pub config: Arc<Config>,
}

/// Create the HTTP router with all routes
pub fn create_server(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Items
        .route(
            "/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/items/:id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/units", get(handlers::list_units))
        // Inventory views
        .route("/inventory/analytics", get(handlers::inventory_analytics))
        .route("/inventory/low-stock", get(handlers::low_stock_alerts))
        .route("/stock/in-stock", get(handlers::in_stock_items))
        .route("/stock/out-of-stock", get(handlers::out_of_stock_items))
        .route("/stock/low-stock", get(handlers::low_stock_items))
        .route("/dashboard/stats", get(handlers::dashboard_stats))
        .route("/analytics/orders", get(handlers::order_analytics))
        .route("/analytics/payments", get(handlers::payment_analytics))
        .route("/analytics/riders", get(handlers::rider_statistics))
        .route_layer(middleware::from_fn(track_requests))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr =
        format!("{}:{}", state.config.server.host, state.config.server.port).parse()?;
    let app = create_server(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server running on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
