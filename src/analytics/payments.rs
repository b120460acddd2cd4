//! Completed payments by method, and order counts and amounts by status.

use crate::db::DatabaseManager;
use crate::domain::{money, OrderStatus};
use crate::error::Result;
use crate::storage::rows::{self, fetch_all};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub const PAYMENT_METHODS: [&str; 4] = ["cash", "upi", "card", "wallet"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentMethodSummary {
    pub method: String,
    pub count: i64,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusSummary {
    pub status: String,
    pub count: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAnalytics {
    /// Completed payments only, one entry per method.
    pub payment_methods: Vec<PaymentMethodSummary>,
    /// One entry per order status, in lifecycle order.
    pub order_status: Vec<OrderStatusSummary>,
}

/// `(key, count, total cents)` grouped rows.
async fn grouped_totals(db: &DatabaseManager, sql: &str) -> Result<HashMap<String, (i64, i64)>> {
    let grouped = fetch_all(db.connection(), sql, libsql::params![], |row| {
        Ok((
            rows::text(row, 0, "key")?,
            rows::int(row, 1, "count")?,
            rows::int_or_zero(row, 2, "total")?,
        ))
    })
    .await?;
    Ok(grouped
        .into_iter()
        .map(|(key, count, total)| (key, (count, total)))
        .collect())
}

pub async fn payment_analytics(db: &DatabaseManager) -> Result<PaymentAnalytics> {
    let methods = grouped_totals(
        db,
        "SELECT method, COUNT(*), SUM(amount_cents) FROM justoo_payments \
         WHERE status = 'completed' GROUP BY method",
    )
    .await?;
    let statuses = grouped_totals(
        db,
        "SELECT status, COUNT(*), SUM(total_amount_cents) FROM orders GROUP BY status",
    )
    .await?;

    let payment_methods = PAYMENT_METHODS
        .iter()
        .map(|method| {
            let (count, total) = methods.get(*method).copied().unwrap_or((0, 0));
            PaymentMethodSummary {
                method: method.to_string(),
                count,
                total: money::from_cents(total),
            }
        })
        .collect();

    let order_status = OrderStatus::ALL
        .iter()
        .map(|status| {
            let (count, total) = statuses.get(status.as_str()).copied().unwrap_or((0, 0));
            OrderStatusSummary {
                status: status.as_str().to_string(),
                count,
                total_amount: money::from_cents(total),
            }
        })
        .collect();

    Ok(PaymentAnalytics {
        payment_methods,
        order_status,
    })
}
