use super::percentage;
use crate::db::DatabaseManager;
use crate::domain::Item;
use crate::error::Result;
use crate::storage::rows::{fetch_count, fetch_items, ITEM_COLUMNS};
use serde::Serialize;

/// One stock bucket with the items that fell into it.
#[derive(Debug, Clone, Serialize)]
pub struct StockBucket {
    pub items: Vec<Item>,
    pub count: i64,
    pub percentage: f64,
}

impl StockBucket {
    fn new(items: Vec<Item>, total: i64) -> Self {
        let count = items.len() as i64;
        Self {
            items,
            count,
            percentage: percentage(count as f64, total as f64),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketSummary {
    pub count: i64,
    pub percentage: f64,
}

/// Active items split by stock level.
///
/// Low stock is `quantity <= min_stock_level`, which also matches every
/// out-of-stock row, so an empty item lands in two buckets. `normal` is what
/// remains after subtracting all three counts and goes negative by the size
/// of that overlap when nothing else is left; see [`StockLevels::reconciliation_gap`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevels {
    pub low_stock: StockBucket,
    pub out_of_stock: StockBucket,
    pub overstock: StockBucket,
    pub normal: BucketSummary,
    pub total_items: i64,
}

impl StockLevels {
    pub fn from_buckets(
        low_stock: Vec<Item>,
        out_of_stock: Vec<Item>,
        overstock: Vec<Item>,
        total_items: i64,
    ) -> Self {
        let low_stock = StockBucket::new(low_stock, total_items);
        let out_of_stock = StockBucket::new(out_of_stock, total_items);
        let overstock = StockBucket::new(overstock, total_items);

        let normal = total_items - low_stock.count - out_of_stock.count - overstock.count;

        Self {
            normal: BucketSummary {
                count: normal,
                percentage: percentage(normal as f64, total_items as f64),
            },
            low_stock,
            out_of_stock,
            overstock,
            total_items,
        }
    }

    /// Number of items counted more than once across the buckets. Zero means
    /// the four counts add up to `total_items` with no double counting.
    pub fn reconciliation_gap(&self) -> i64 {
        self.out_of_stock
            .items
            .iter()
            .filter(|item| item.quantity <= item.min_stock_level)
            .count() as i64
    }
}

pub async fn stock_levels(db: &DatabaseManager, overstock_multiplier: i64) -> Result<StockLevels> {
    let conn = db.connection();

    let low_stock = fetch_items(
        conn,
        &format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE is_active = 1 AND quantity <= min_stock_level ORDER BY id"
        ),
        libsql::params![],
    )
    .await?;

    let out_of_stock = fetch_items(
        conn,
        &format!("SELECT {ITEM_COLUMNS} FROM items WHERE is_active = 1 AND quantity = 0 ORDER BY id"),
        libsql::params![],
    )
    .await?;

    let overstock = fetch_items(
        conn,
        &format!(
            "SELECT {ITEM_COLUMNS} FROM items \
             WHERE is_active = 1 AND quantity > min_stock_level * ?1 ORDER BY id"
        ),
        libsql::params![overstock_multiplier],
    )
    .await?;

    let total = fetch_count(
        conn,
        "SELECT COUNT(*) FROM items WHERE is_active = 1",
        libsql::params![],
    )
    .await?;

    Ok(StockLevels::from_buckets(
        low_stock,
        out_of_stock,
        overstock,
        total,
    ))
}
