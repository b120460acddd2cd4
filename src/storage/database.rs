use super::rows::{self, fetch_count, fetch_items, fetch_one, item_from_row, ITEM_COLUMNS};
use super::{ItemStore, StockFilter};
use crate::db::DatabaseManager;
use crate::domain::{money, DashboardStats, Item, ItemChanges, NewItem};
use crate::error::{AppError, Result};
use crate::query::{ItemPage, ItemQuery, Pagination};
use async_trait::async_trait;
use libsql::params::Params;
use libsql::Value;
use std::sync::Arc;
use tracing::{debug, info};

const SKU_CONFLICT: &str = "An item with this SKU already exists";
const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%SZ', 'now')";

/// [`ItemStore`] backed by the libSQL `items` table.
pub struct DatabaseStorage {
    db: Arc<DatabaseManager>,
}

impl DatabaseStorage {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    fn optional_text(value: &Option<String>) -> Value {
        match value {
            Some(v) => Value::Text(v.clone()),
            None => Value::Null,
        }
    }
}

#[async_trait]
impl ItemStore for DatabaseStorage {
    async fn list_items(&self, query: &ItemQuery) -> Result<ItemPage> {
        let conn = self.db.connection();

        let (select_sql, select_values) = query.select_sql();
        debug!(sql = %select_sql, "listing items");
        let items = fetch_items(conn, &select_sql, Params::Positional(select_values)).await?;

        let (count_sql, count_values) = query.count_sql();
        let total = fetch_count(conn, &count_sql, Params::Positional(count_values)).await?;

        Ok(ItemPage {
            items,
            pagination: Pagination::new(query.page, query.limit, total.max(0) as u64),
        })
    }

    async fn get_item(&self, id: i64) -> Result<Option<Item>> {
        fetch_one(
            self.db.connection(),
            &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?1 LIMIT 1"),
            libsql::params![id],
            item_from_row,
        )
        .await
    }

    async fn create_item(&self, item: &NewItem) -> Result<Item> {
        let values = vec![
            Self::optional_text(&item.sku),
            Value::Text(item.name.clone()),
            Self::optional_text(&item.description),
            Value::Integer(item.price_cents),
            Value::Integer(item.quantity),
            Value::Integer(item.min_stock_level),
            Value::Text(item.unit.as_str().to_string()),
            Self::optional_text(&item.category),
        ];

        let created = fetch_one(
            self.db.connection(),
            &format!(
                "INSERT INTO items (sku, name, description, price_cents, quantity, \
                 min_stock_level, unit, category, is_active) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1) RETURNING {ITEM_COLUMNS}"
            ),
            Params::Positional(values),
            item_from_row,
        )
        .await
        .map_err(|e| e.on_unique_violation(SKU_CONFLICT))?
        .ok_or_else(|| AppError::Database {
            message: "Insert returned no row".to_string(),
        })?;

        info!("Created item: {} with id {}", created.name, created.id);
        Ok(created)
    }

    async fn update_item(&self, id: i64, changes: &ItemChanges) -> Result<Option<Item>> {
        let updated_at = format!("updated_at = {NOW}");
        let mut assignments: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(name) = &changes.name {
            assignments.push("name = ?");
            values.push(Value::Text(name.clone()));
        }
        if let Some(sku) = &changes.sku {
            assignments.push("sku = ?");
            values.push(Self::optional_text(sku));
        }
        if let Some(description) = &changes.description {
            assignments.push("description = ?");
            values.push(Self::optional_text(description));
        }
        if let Some(price_cents) = changes.price_cents {
            assignments.push("price_cents = ?");
            values.push(Value::Integer(price_cents));
        }
        if let Some(quantity) = changes.quantity {
            assignments.push("quantity = ?");
            values.push(Value::Integer(quantity));
        }
        if let Some(min_stock_level) = changes.min_stock_level {
            assignments.push("min_stock_level = ?");
            values.push(Value::Integer(min_stock_level));
        }
        if let Some(unit) = changes.unit {
            assignments.push("unit = ?");
            values.push(Value::Text(unit.as_str().to_string()));
        }
        if let Some(category) = &changes.category {
            assignments.push("category = ?");
            values.push(Self::optional_text(category));
        }
        if let Some(active) = changes.is_active {
            assignments.push("is_active = ?");
            values.push(Value::Integer(i64::from(active)));
        }

        assignments.push(&updated_at);
        values.push(Value::Integer(id));

        let sql = format!(
            "UPDATE items SET {} WHERE id = ? RETURNING {ITEM_COLUMNS}",
            assignments.join(", ")
        );

        let updated = fetch_one(
            self.db.connection(),
            &sql,
            Params::Positional(values),
            item_from_row,
        )
        .await
        .map_err(|e| e.on_unique_violation(SKU_CONFLICT))?;

        if let Some(item) = &updated {
            info!("Updated item: {} with id {}", item.name, item.id);
        }
        Ok(updated)
    }

    async fn deactivate_item(&self, id: i64) -> Result<Option<Item>> {
        let deactivated = fetch_one(
            self.db.connection(),
            &format!(
                "UPDATE items SET is_active = 0, updated_at = {NOW} \
                 WHERE id = ?1 RETURNING {ITEM_COLUMNS}"
            ),
            libsql::params![id],
            item_from_row,
        )
        .await?;

        if let Some(item) = &deactivated {
            info!("Deactivated item: {} with id {}", item.name, item.id);
        }
        Ok(deactivated)
    }

    async fn low_stock_alerts(&self) -> Result<Vec<Item>> {
        fetch_items(
            self.db.connection(),
            &format!(
                "SELECT {ITEM_COLUMNS} FROM items \
                 WHERE is_active = 1 AND quantity <= min_stock_level \
                 ORDER BY quantity - min_stock_level ASC, id ASC"
            ),
            libsql::params![],
        )
        .await
    }

    async fn stock_listing(&self, filter: StockFilter) -> Result<Vec<Item>> {
        let condition = match filter {
            StockFilter::InStock => "quantity > 0",
            StockFilter::OutOfStock => "quantity = 0",
            StockFilter::LowStock => "quantity > 0 AND quantity <= min_stock_level",
        };

        fetch_items(
            self.db.connection(),
            &format!(
                "SELECT {ITEM_COLUMNS} FROM items \
                 WHERE is_active = 1 AND {condition} ORDER BY name ASC, id ASC"
            ),
            libsql::params![],
        )
        .await
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let stats = fetch_one(
            self.db.connection(),
            "SELECT COUNT(*), \
                    COUNT(CASE WHEN quantity > 0 THEN 1 END), \
                    COUNT(CASE WHEN quantity = 0 THEN 1 END), \
                    COUNT(CASE WHEN quantity > 0 AND quantity <= min_stock_level THEN 1 END), \
                    SUM(price_cents * quantity) \
             FROM items WHERE is_active = 1",
            libsql::params![],
            |row| {
                Ok(DashboardStats {
                    total_items: rows::int_or_zero(row, 0, "total_items")?,
                    in_stock_items: rows::int_or_zero(row, 1, "in_stock_items")?,
                    out_of_stock_items: rows::int_or_zero(row, 2, "out_of_stock_items")?,
                    low_stock_items: rows::int_or_zero(row, 3, "low_stock_items")?,
                    total_inventory_value: money::from_cents(rows::int_or_zero(
                        row,
                        4,
                        "total_inventory_value",
                    )?),
                })
            },
        )
        .await?;

        Ok(stats.unwrap_or(DashboardStats {
            total_items: 0,
            in_stock_items: 0,
            out_of_stock_items: 0,
            low_stock_items: 0,
            total_inventory_value: money::from_cents(0),
        }))
    }
}
