use crate::db::DatabaseManager;
use crate::domain::money;
use crate::error::Result;
use crate::storage::rows::{self, fetch_all};
use rust_decimal::Decimal;
use serde::Serialize;

/// Stock label attached to sales rankings, computed from current quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StockStatus {
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "In Stock")]
    InStock,
}

impl StockStatus {
    /// Empty wins over low, so a zero-quantity item is never labelled low.
    pub fn classify(quantity: i64, min_stock_level: i64) -> Self {
        if quantity == 0 {
            StockStatus::OutOfStock
        } else if quantity <= min_stock_level {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSellingItem {
    pub item_id: i64,
    pub item_name: String,
    pub total_sold: i64,
    pub current_stock: i64,
    pub stock_status: StockStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopRevenueItem {
    pub item_id: i64,
    pub item_name: String,
    pub total_revenue: Decimal,
    pub total_quantity_sold: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlowMovingItem {
    pub id: i64,
    pub name: String,
    pub current_stock: i64,
    pub category: Option<String>,
    pub total_sold: i64,
    pub days_in_inventory: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAnalytics {
    pub top_selling_by_quantity: Vec<TopSellingItem>,
    pub top_selling_by_revenue: Vec<TopRevenueItem>,
    pub slow_moving_items: Vec<SlowMovingItem>,
}

/// Sales rankings over every order line, whatever the order's status or
/// the item's active flag; slow movers only consider active items.
pub async fn performance_analytics(
    db: &DatabaseManager,
    top_limit: u32,
    slow_limit: u32,
) -> Result<PerformanceAnalytics> {
    let conn = db.connection();

    let top_selling_by_quantity = fetch_all(
        conn,
        "SELECT oi.item_id, i.name, SUM(oi.quantity) AS total_sold, \
                i.quantity, i.min_stock_level \
         FROM order_items oi INNER JOIN items i ON oi.item_id = i.id \
         GROUP BY oi.item_id, i.name, i.quantity, i.min_stock_level \
         ORDER BY total_sold DESC, oi.item_id ASC LIMIT ?1",
        libsql::params![i64::from(top_limit)],
        |row| {
            let current_stock = rows::int(row, 3, "quantity")?;
            let min_stock_level = rows::int(row, 4, "min_stock_level")?;
            Ok(TopSellingItem {
                item_id: rows::int(row, 0, "item_id")?,
                item_name: rows::text(row, 1, "name")?,
                total_sold: rows::int_or_zero(row, 2, "total_sold")?,
                current_stock,
                stock_status: StockStatus::classify(current_stock, min_stock_level),
            })
        },
    )
    .await?;

    let top_selling_by_revenue = fetch_all(
        conn,
        "SELECT oi.item_id, i.name, SUM(oi.total_price_cents) AS revenue, \
                SUM(oi.quantity) \
         FROM order_items oi INNER JOIN items i ON oi.item_id = i.id \
         GROUP BY oi.item_id, i.name \
         ORDER BY revenue DESC, oi.item_id ASC LIMIT ?1",
        libsql::params![i64::from(top_limit)],
        |row| {
            Ok(TopRevenueItem {
                item_id: rows::int(row, 0, "item_id")?,
                item_name: rows::text(row, 1, "name")?,
                total_revenue: money::from_cents(rows::int_or_zero(row, 2, "revenue")?),
                total_quantity_sold: rows::int_or_zero(row, 3, "total_quantity_sold")?,
            })
        },
    )
    .await?;

    let slow_moving_items = fetch_all(
        conn,
        "SELECT i.id, i.name, i.quantity, i.category, \
                COALESCE(sold.total_sold, 0) AS total_sold, \
                CAST(julianday('now') - julianday(i.created_at) AS INTEGER) \
         FROM items i \
         LEFT JOIN (SELECT item_id, SUM(quantity) AS total_sold \
                    FROM order_items GROUP BY item_id) sold \
           ON sold.item_id = i.id \
         WHERE i.is_active = 1 \
         ORDER BY total_sold ASC, i.id ASC LIMIT ?1",
        libsql::params![i64::from(slow_limit)],
        |row| {
            Ok(SlowMovingItem {
                id: rows::int(row, 0, "id")?,
                name: rows::text(row, 1, "name")?,
                current_stock: rows::int(row, 2, "quantity")?,
                category: rows::opt_text(row, 3, "category")?,
                total_sold: rows::int_or_zero(row, 4, "total_sold")?,
                days_in_inventory: rows::int_or_zero(row, 5, "days_in_inventory")?,
            })
        },
    )
    .await?;

    Ok(PerformanceAnalytics {
        top_selling_by_quantity,
        top_selling_by_revenue,
        slow_moving_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_stock_takes_precedence() {
        assert_eq!(StockStatus::classify(0, 10), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(0, 0), StockStatus::OutOfStock);
        assert_eq!(StockStatus::classify(10, 10), StockStatus::LowStock);
        assert_eq!(StockStatus::classify(11, 10), StockStatus::InStock);
    }

    #[test]
    fn status_labels_are_human_readable() {
        assert_eq!(
            serde_json::to_value(StockStatus::OutOfStock).unwrap(),
            "Out of Stock"
        );
        assert_eq!(serde_json::to_value(StockStatus::InStock).unwrap(), "In Stock");
    }
}
