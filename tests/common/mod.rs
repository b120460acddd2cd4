#![allow(dead_code)]

use anyhow::Result;
use justoo_inventory::db::DatabaseManager;
use std::sync::Arc;
use tempfile::TempDir;

/// A migrated database in a throwaway directory. Keep the `TempDir` alive
/// for as long as the database is used.
pub async fn test_db() -> Result<(TempDir, Arc<DatabaseManager>)> {
    let dir = tempfile::tempdir()?;
    let db = DatabaseManager::open_local(dir.path().join("test.db")).await?;
    db.run_migrations().await?;
    Ok((dir, Arc::new(db)))
}

pub async fn exec(db: &DatabaseManager, sql: &str) -> Result<()> {
    db.connection().execute_batch(sql).await?;
    Ok(())
}

/// Insert an active item and return its id.
pub async fn insert_item(
    db: &DatabaseManager,
    name: &str,
    price_cents: i64,
    quantity: i64,
    min_stock_level: i64,
    category: Option<&str>,
) -> Result<i64> {
    let category = match category {
        Some(c) => libsql::Value::Text(c.to_string()),
        None => libsql::Value::Null,
    };
    let mut rows = db
        .connection()
        .query(
            "INSERT INTO items (name, price_cents, quantity, min_stock_level, unit, category) \
             VALUES (?1, ?2, ?3, ?4, 'pieces', ?5) RETURNING id",
            libsql::params![name, price_cents, quantity, min_stock_level, category],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| anyhow::anyhow!("insert returned no id"))?;
    Ok(row.get::<i64>(0)?)
}

/// Insert an order with one line per `(item_id, quantity, unit_price_cents)`.
pub async fn insert_order(
    db: &DatabaseManager,
    status: &str,
    created_at: &str,
    lines: &[(i64, i64, i64)],
) -> Result<i64> {
    let total: i64 = lines.iter().map(|(_, qty, price)| qty * price).sum();
    let mut rows = db
        .connection()
        .query(
            "INSERT INTO orders (customer_id, status, total_amount_cents, item_count, created_at) \
             VALUES (1, ?1, ?2, ?3, ?4) RETURNING id",
            libsql::params![status, total, lines.len() as i64, created_at],
        )
        .await?;
    let order_id = rows
        .next()
        .await?
        .ok_or_else(|| anyhow::anyhow!("insert returned no id"))?
        .get::<i64>(0)?;
    drop(rows);

    for (item_id, quantity, unit_price) in lines {
        db.connection()
            .execute(
                "INSERT INTO order_items (order_id, item_id, item_name, quantity, \
                 unit_price_cents, total_price_cents, unit) \
                 VALUES (?1, ?2, 'line', ?3, ?4, ?5, 'pieces')",
                libsql::params![order_id, *item_id, *quantity, *unit_price, quantity * unit_price],
            )
            .await?;
    }
    Ok(order_id)
}
