//! Read-side aggregates over the inventory and order tables.
//!
//! Each aggregator takes the [`DatabaseManager`] explicitly and issues its
//! own queries. [`inventory_analytics`] merges the four inventory views into
//! the single `/inventory/analytics` payload; a failure in any of them fails
//! the whole build.

use crate::config::AnalyticsConfig;
use crate::db::DatabaseManager;
use crate::error::Result;
use crate::metrics::{time_operation, ANALYTICS_BUILD_DURATION_SECONDS, ANALYTICS_FAILURES_TOTAL};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error};

pub mod category;
pub mod financial;
pub mod orders;
pub mod payments;
pub mod performance;
pub mod riders;
pub mod stock;

pub use category::CategoryAnalytics;
pub use financial::{FinancialAnalytics, PriceBands};
pub use orders::{DateRange, OrderAnalytics};
pub use payments::PaymentAnalytics;
pub use performance::PerformanceAnalytics;
pub use riders::RiderStatistics;
pub use stock::StockLevels;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole` as a percentage with two decimals; zero when `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        round2(part / whole * 100.0)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryAnalytics {
    pub stock_levels: StockLevels,
    pub financial: FinancialAnalytics,
    pub performance: PerformanceAnalytics,
    pub categories: CategoryAnalytics,
    pub timestamp: DateTime<Utc>,
}

/// Build every inventory aggregate. Runs them one after another on the
/// shared connection.
pub async fn inventory_analytics(
    db: &DatabaseManager,
    config: &AnalyticsConfig,
) -> Result<InventoryAnalytics> {
    let _timer = time_operation(ANALYTICS_BUILD_DURATION_SECONDS);

    let result = build(db, config).await;
    if let Err(e) = &result {
        error!("Inventory analytics build failed: {}", e);
        ::metrics::counter!(ANALYTICS_FAILURES_TOTAL).increment(1);
    }
    result
}

async fn build(db: &DatabaseManager, config: &AnalyticsConfig) -> Result<InventoryAnalytics> {
    let stock_levels = stock::stock_levels(db, config.overstock_multiplier).await?;
    debug!(total = stock_levels.total_items, "stock levels computed");

    let bands = PriceBands::from_config(&config.price_bands);
    let financial =
        financial::financial_analytics(db, &bands, config.price_extremes_limit).await?;

    let performance =
        performance::performance_analytics(db, config.top_items_limit, config.slow_movers_limit)
            .await?;

    let categories = category::category_analytics(db).await?;

    Ok(InventoryAnalytics {
        stock_levels,
        financial,
        performance,
        categories,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_handles_zero_denominator() {
        assert_eq!(percentage(3.0, 0.0), 0.0);
        assert_eq!(percentage(1.0, 3.0), 33.33);
        assert_eq!(percentage(2.0, 3.0), 66.67);
        assert_eq!(percentage(5.0, 5.0), 100.0);
    }
}
