//! Row decoding shared by the repositories and the analytics queries.
//!
//! Values are read through `get_value` and matched by variant because
//! SQLite aggregates change type with their input (`SUM` over no rows is
//! `NULL`, `AVG` is always real).

use crate::domain::{money, parse_timestamp, Item, Unit};
use crate::error::{AppError, Result};
use libsql::params::IntoParams;
use libsql::{Connection, Row, Value};

pub const ITEM_COLUMNS: &str = "id, sku, name, description, price_cents, quantity, \
     min_stock_level, unit, category, is_active, created_at, updated_at";

fn value(row: &Row, idx: i32, column: &str) -> Result<Value> {
    row.get_value(idx)
        .map_err(|e| AppError::database(&format!("Failed to get {column}"), e))
}

fn type_error(column: &str, found: &Value) -> AppError {
    AppError::Database {
        message: format!("Unexpected value for {column}: {found:?}"),
    }
}

/// SQLite turns an overflowing integer product into a REAL, so only
/// integral reals that fit an i64 are accepted.
fn integral(v: f64, column: &str) -> Result<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    if v.is_finite() && v.fract() == 0.0 && (-LIMIT..LIMIT).contains(&v) {
        Ok(v as i64)
    } else {
        Err(type_error(column, &Value::Real(v)))
    }
}

pub fn int(row: &Row, idx: i32, column: &str) -> Result<i64> {
    match value(row, idx, column)? {
        Value::Integer(v) => Ok(v),
        Value::Real(v) => integral(v, column),
        other => Err(type_error(column, &other)),
    }
}

pub fn opt_int(row: &Row, idx: i32, column: &str) -> Result<Option<i64>> {
    match value(row, idx, column)? {
        Value::Null => Ok(None),
        Value::Integer(v) => Ok(Some(v)),
        Value::Real(v) => integral(v, column).map(Some),
        other => Err(type_error(column, &other)),
    }
}

/// Aggregate that is `NULL` over an empty set reads as zero.
pub fn int_or_zero(row: &Row, idx: i32, column: &str) -> Result<i64> {
    Ok(opt_int(row, idx, column)?.unwrap_or(0))
}

pub fn real_or_zero(row: &Row, idx: i32, column: &str) -> Result<f64> {
    match value(row, idx, column)? {
        Value::Null => Ok(0.0),
        Value::Integer(v) => Ok(v as f64),
        Value::Real(v) => Ok(v),
        other => Err(type_error(column, &other)),
    }
}

pub fn text(row: &Row, idx: i32, column: &str) -> Result<String> {
    match value(row, idx, column)? {
        Value::Text(v) => Ok(v),
        other => Err(type_error(column, &other)),
    }
}

pub fn opt_text(row: &Row, idx: i32, column: &str) -> Result<Option<String>> {
    match value(row, idx, column)? {
        Value::Null => Ok(None),
        Value::Text(v) => Ok(Some(v)),
        other => Err(type_error(column, &other)),
    }
}

/// Decode a row selected with [`ITEM_COLUMNS`].
pub fn item_from_row(row: &Row) -> Result<Item> {
    let unit_raw = text(row, 7, "unit")?;
    let unit: Unit = unit_raw
        .parse()
        .map_err(|e: String| AppError::Database { message: e })?;

    Ok(Item {
        id: int(row, 0, "id")?,
        sku: opt_text(row, 1, "sku")?,
        name: text(row, 2, "name")?,
        description: opt_text(row, 3, "description")?,
        price: money::from_cents(int(row, 4, "price_cents")?),
        quantity: int(row, 5, "quantity")?,
        min_stock_level: int(row, 6, "min_stock_level")?,
        unit,
        category: opt_text(row, 8, "category")?,
        is_active: int(row, 9, "is_active")? == 1,
        created_at: opt_text(row, 10, "created_at")?
            .as_deref()
            .and_then(parse_timestamp),
        updated_at: opt_text(row, 11, "updated_at")?
            .as_deref()
            .and_then(parse_timestamp),
    })
}

/// Run `sql` and decode every row with `decode`.
pub async fn fetch_all<T>(
    conn: &Connection,
    sql: &str,
    params: impl IntoParams,
    decode: impl Fn(&Row) -> Result<T>,
) -> Result<Vec<T>> {
    let mut rows = conn
        .query(sql, params)
        .await
        .map_err(|e| AppError::database("Failed to run query", e))?;

    let mut results = Vec::new();
    while let Some(row) = rows
        .next()
        .await
        .map_err(|e| AppError::database("Failed to read row", e))?
    {
        results.push(decode(&row)?);
    }
    Ok(results)
}

/// Run `sql` and decode the first row, if any.
pub async fn fetch_one<T>(
    conn: &Connection,
    sql: &str,
    params: impl IntoParams,
    decode: impl Fn(&Row) -> Result<T>,
) -> Result<Option<T>> {
    let mut rows = conn
        .query(sql, params)
        .await
        .map_err(|e| AppError::database("Failed to run query", e))?;

    match rows
        .next()
        .await
        .map_err(|e| AppError::database("Failed to read row", e))?
    {
        Some(row) => Ok(Some(decode(&row)?)),
        None => Ok(None),
    }
}

pub async fn fetch_items(
    conn: &Connection,
    sql: &str,
    params: impl IntoParams,
) -> Result<Vec<Item>> {
    fetch_all(conn, sql, params, item_from_row).await
}

/// Run a single-column `COUNT(*)` style query.
pub async fn fetch_count(conn: &Connection, sql: &str, params: impl IntoParams) -> Result<i64> {
    Ok(fetch_one(conn, sql, params, |row| int_or_zero(row, 0, "count"))
        .await?
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_reals_convert() {
        assert_eq!(integral(42.0, "total").unwrap(), 42);
        assert_eq!(integral(-7.0, "total").unwrap(), -7);
    }

    #[test]
    fn overflowed_or_fractional_reals_are_errors() {
        for v in [1e19, -1e19, 9_223_372_036_854_775_808.0, 2.5, f64::NAN, f64::INFINITY] {
            assert!(
                matches!(integral(v, "total"), Err(AppError::Database { .. })),
                "{v} should not read as an integer"
            );
        }
    }
}
