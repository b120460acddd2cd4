use crate::db::DatabaseManager;
use crate::domain::{money, OrderStatus};
use crate::error::{AppError, Result};
use crate::storage::rows::{self, fetch_all, fetch_count, fetch_one};
use chrono::{Days, NaiveDate};
use libsql::params::Params;
use libsql::Value;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Inclusive calendar-day range over `orders.created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Both bounds or neither; `YYYY-MM-DD`; start not after end.
    pub fn from_params(start: Option<&str>, end: Option<&str>) -> Result<Option<Self>> {
        let (start, end) = match (start, end) {
            (None, None) => return Ok(None),
            (Some(start), Some(end)) => (parse_day(start, "startDate")?, parse_day(end, "endDate")?),
            _ => {
                return Err(AppError::Validation(
                    "startDate and endDate must be provided together".to_string(),
                ))
            }
        };

        if start > end {
            return Err(AppError::Validation(
                "startDate must not be after endDate".to_string(),
            ));
        }
        Ok(Some(Self { start, end }))
    }

    /// `created_at` condition covering the whole end day, with its values.
    fn condition(&self) -> (&'static str, Vec<Value>) {
        let end_exclusive = self
            .end
            .checked_add_days(Days::new(1))
            .unwrap_or(self.end);
        (
            "created_at >= ? AND created_at < ?",
            vec![
                Value::Text(self.start.format("%Y-%m-%d").to_string()),
                Value::Text(end_exclusive.format("%Y-%m-%d").to_string()),
            ],
        )
    }
}

fn parse_day(raw: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("{field} must be a date in YYYY-MM-DD format, got '{raw}'"))
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub total: Decimal,
    pub average: Decimal,
    pub highest: Decimal,
    pub lowest: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenue {
    pub date: String,
    pub revenue: Decimal,
    pub order_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAnalytics {
    pub total_orders: i64,
    /// Every status is present, zero when no order has it.
    pub orders_by_status: BTreeMap<String, i64>,
    /// Delivered orders only.
    pub revenue: RevenueSummary,
    pub daily_trend: Vec<DailyRevenue>,
}

fn where_sql(conditions: &[&str]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

pub async fn order_analytics(
    db: &DatabaseManager,
    range: Option<DateRange>,
    trend_days: u32,
) -> Result<OrderAnalytics> {
    let conn = db.connection();

    let mut conditions: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(range) = &range {
        let (condition, range_values) = range.condition();
        conditions.push(condition);
        values.extend(range_values);
    }

    let total_orders = fetch_count(
        conn,
        &format!("SELECT COUNT(*) FROM orders{}", where_sql(&conditions)),
        Params::Positional(values.clone()),
    )
    .await?;

    let mut orders_by_status: BTreeMap<String, i64> = OrderStatus::ALL
        .iter()
        .map(|status| (status.as_str().to_string(), 0))
        .collect();
    let status_counts = fetch_all(
        conn,
        &format!(
            "SELECT status, COUNT(*) FROM orders{} GROUP BY status",
            where_sql(&conditions)
        ),
        Params::Positional(values.clone()),
        |row| Ok((rows::text(row, 0, "status")?, rows::int(row, 1, "count")?)),
    )
    .await?;
    for (status, count) in status_counts {
        orders_by_status.insert(status, count);
    }

    let mut delivered_conditions = conditions.clone();
    delivered_conditions.push("status = 'delivered'");
    let revenue = fetch_one(
        conn,
        &format!(
            "SELECT SUM(total_amount_cents), AVG(total_amount_cents), \
                    MAX(total_amount_cents), MIN(total_amount_cents) FROM orders{}",
            where_sql(&delivered_conditions)
        ),
        Params::Positional(values),
        |row| {
            Ok(RevenueSummary {
                total: money::from_cents(rows::int_or_zero(row, 0, "total")?),
                average: money::from_avg_cents(rows::real_or_zero(row, 1, "average")?),
                highest: money::from_cents(rows::int_or_zero(row, 2, "highest")?),
                lowest: money::from_cents(rows::int_or_zero(row, 3, "lowest")?),
            })
        },
    )
    .await?
    .unwrap_or(RevenueSummary {
        total: Decimal::ZERO,
        average: Decimal::ZERO,
        highest: Decimal::ZERO,
        lowest: Decimal::ZERO,
    });

    let daily_trend = fetch_all(
        conn,
        "SELECT DATE(created_at) AS day, SUM(total_amount_cents), COUNT(*) \
         FROM orders \
         WHERE status = 'delivered' \
           AND julianday(created_at) >= julianday('now', ?1) \
         GROUP BY day ORDER BY day",
        libsql::params![format!("-{trend_days} days")],
        |row| {
            Ok(DailyRevenue {
                date: rows::text(row, 0, "date")?,
                revenue: money::from_cents(rows::int_or_zero(row, 1, "revenue")?),
                order_count: rows::int(row, 2, "order_count")?,
            })
        },
    )
    .await?;

    Ok(OrderAnalytics {
        total_orders,
        orders_by_status,
        revenue,
        daily_trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_requires_both_bounds() {
        assert!(DateRange::from_params(None, None).unwrap().is_none());
        assert!(matches!(
            DateRange::from_params(Some("2024-03-01"), None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn range_rejects_bad_dates_and_reversed_bounds() {
        assert!(DateRange::from_params(Some("03/01/2024"), Some("2024-03-02")).is_err());
        assert!(DateRange::from_params(Some("2024-03-05"), Some("2024-03-01")).is_err());
    }

    #[test]
    fn end_day_is_inclusive() {
        let range = DateRange::from_params(Some("2024-02-28"), Some("2024-02-29"))
            .unwrap()
            .unwrap();
        let (sql, values) = range.condition();
        assert_eq!(sql, "created_at >= ? AND created_at < ?");
        assert!(matches!(&values[0], Value::Text(s) if s == "2024-02-28"));
        assert!(matches!(&values[1], Value::Text(s) if s == "2024-03-01"));
    }
}
