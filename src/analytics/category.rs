use super::percentage;
use crate::db::DatabaseManager;
use crate::domain::money;
use crate::error::Result;
use crate::storage::rows::{self, fetch_all};
use rust_decimal::Decimal;
use serde::Serialize;

/// Aggregates for one category as read from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub category: Option<String>,
    pub item_count: i64,
    pub total_value_cents: i64,
    pub avg_price_cents: f64,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: Option<String>,
    pub item_count: i64,
    pub total_value: Decimal,
    pub avg_price: Decimal,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
    pub item_percentage: f64,
    pub value_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub total_items: i64,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAnalytics {
    pub categories: Vec<CategoryStats>,
    pub total_categories: usize,
    pub summary: CategorySummary,
}

impl CategoryAnalytics {
    /// Attach each category's share of the item count and of the stock value.
    pub fn with_percentages(rows: Vec<CategoryRow>) -> Self {
        let total_items: i64 = rows.iter().map(|r| r.item_count).sum();
        let total_value_cents: i64 = rows.iter().map(|r| r.total_value_cents).sum();

        let categories: Vec<CategoryStats> = rows
            .into_iter()
            .map(|row| {
                let avg_price = money::from_avg_cents(row.avg_price_cents);
                CategoryStats {
                    item_percentage: percentage(row.item_count as f64, total_items as f64),
                    value_percentage: percentage(
                        row.total_value_cents as f64,
                        total_value_cents as f64,
                    ),
                    category: row.category,
                    item_count: row.item_count,
                    total_value: money::from_cents(row.total_value_cents),
                    avg_price,
                    low_stock_count: row.low_stock_count,
                    out_of_stock_count: row.out_of_stock_count,
                }
            })
            .collect();

        Self {
            total_categories: categories.len(),
            categories,
            summary: CategorySummary {
                total_items,
                total_value: money::from_cents(total_value_cents),
            },
        }
    }

    pub fn item_percentage_sum(&self) -> f64 {
        self.categories.iter().map(|c| c.item_percentage).sum()
    }
}

pub async fn category_analytics(db: &DatabaseManager) -> Result<CategoryAnalytics> {
    let rows = fetch_all(
        db.connection(),
        "SELECT category, COUNT(*), SUM(price_cents * quantity), AVG(price_cents), \
                COUNT(CASE WHEN quantity <= min_stock_level THEN 1 END), \
                COUNT(CASE WHEN quantity = 0 THEN 1 END) \
         FROM items WHERE is_active = 1 \
         GROUP BY category \
         ORDER BY COUNT(*) DESC, category ASC",
        libsql::params![],
        |row| {
            Ok(CategoryRow {
                category: rows::opt_text(row, 0, "category")?,
                item_count: rows::int_or_zero(row, 1, "item_count")?,
                total_value_cents: rows::int_or_zero(row, 2, "total_value")?,
                avg_price_cents: rows::real_or_zero(row, 3, "avg_price")?,
                low_stock_count: rows::int_or_zero(row, 4, "low_stock_count")?,
                out_of_stock_count: rows::int_or_zero(row, 5, "out_of_stock_count")?,
            })
        },
    )
    .await?;

    Ok(CategoryAnalytics::with_percentages(rows))
}
