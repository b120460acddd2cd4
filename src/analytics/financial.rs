use crate::config::PriceBandConfig;
use crate::db::DatabaseManager;
use crate::domain::{money, Item};
use crate::error::Result;
use crate::storage::rows::{self, fetch_all, fetch_items, fetch_one, ITEM_COLUMNS};
use libsql::params::Params;
use libsql::Value;
use rust_decimal::Decimal;
use serde::Serialize;

/// Price histogram boundaries, in minor units, with a display label per band.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBands {
    upper_bounds_cents: Vec<i64>,
    labels: Vec<String>,
}

impl PriceBands {
    /// `upper_bounds` are inclusive and in major units; one extra open-ended
    /// band follows the last bound.
    pub fn from_config(config: &PriceBandConfig) -> Self {
        let symbol = &config.currency_symbol;
        let bounds = &config.upper_bounds;

        let mut labels = Vec::with_capacity(bounds.len() + 1);
        for (i, bound) in bounds.iter().enumerate() {
            if i == 0 {
                labels.push(format!("Under {symbol}{bound}"));
            } else {
                labels.push(format!("{symbol}{} - {symbol}{bound}", bounds[i - 1]));
            }
        }
        if let Some(last) = bounds.last() {
            labels.push(format!("Over {symbol}{last}"));
        } else {
            labels.push("All prices".to_string());
        }

        Self {
            upper_bounds_cents: bounds.iter().map(|b| b * 100).collect(),
            labels,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// A `CASE` expression mapping `price_cents` to a band index, with one
    /// placeholder per boundary.
    fn case_sql(&self) -> String {
        let mut sql = String::from("CASE");
        for (index, _) in self.upper_bounds_cents.iter().enumerate() {
            sql.push_str(&format!(" WHEN price_cents <= ? THEN {index}"));
        }
        sql.push_str(&format!(" ELSE {} END", self.upper_bounds_cents.len()));
        sql
    }

    fn values(&self) -> Vec<Value> {
        self.upper_bounds_cents
            .iter()
            .map(|b| Value::Integer(*b))
            .collect()
    }

    /// Index of the band `price_cents` falls into.
    pub fn band_of(&self, price_cents: i64) -> usize {
        self.upper_bounds_cents
            .iter()
            .position(|bound| price_cents <= *bound)
            .unwrap_or(self.upper_bounds_cents.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBandSummary {
    pub range: String,
    pub count: i64,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAnalytics {
    pub total_inventory_value: Decimal,
    pub total_items: i64,
    pub average_item_price: Decimal,
    pub highest_price: Decimal,
    pub lowest_price: Decimal,
    pub most_expensive: Vec<Item>,
    pub least_expensive: Vec<Item>,
    pub price_distribution: Vec<PriceBandSummary>,
}

struct Totals {
    value_cents: i64,
    items: i64,
    avg_cents: f64,
    max_cents: i64,
    min_cents: i64,
}

pub async fn financial_analytics(
    db: &DatabaseManager,
    bands: &PriceBands,
    extremes_limit: u32,
) -> Result<FinancialAnalytics> {
    let conn = db.connection();

    let totals = fetch_one(
        conn,
        "SELECT SUM(price_cents * quantity), COUNT(*), AVG(price_cents), \
                MAX(price_cents), MIN(price_cents) \
         FROM items WHERE is_active = 1",
        libsql::params![],
        |row| {
            Ok(Totals {
                value_cents: rows::int_or_zero(row, 0, "total_value")?,
                items: rows::int_or_zero(row, 1, "total_items")?,
                avg_cents: rows::real_or_zero(row, 2, "avg_price")?,
                max_cents: rows::int_or_zero(row, 3, "max_price")?,
                min_cents: rows::int_or_zero(row, 4, "min_price")?,
            })
        },
    )
    .await?
    .unwrap_or(Totals {
        value_cents: 0,
        items: 0,
        avg_cents: 0.0,
        max_cents: 0,
        min_cents: 0,
    });

    let most_expensive = fetch_items(
        conn,
        &format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE is_active = 1 \
             ORDER BY price_cents DESC, id ASC LIMIT ?1"
        ),
        libsql::params![i64::from(extremes_limit)],
    )
    .await?;

    let least_expensive = fetch_items(
        conn,
        &format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE is_active = 1 \
             ORDER BY price_cents ASC, id ASC LIMIT ?1"
        ),
        libsql::params![i64::from(extremes_limit)],
    )
    .await?;

    let band_rows = fetch_all(
        conn,
        &format!(
            "SELECT band, COUNT(*), SUM(price_cents * quantity) FROM \
             (SELECT {} AS band, price_cents, quantity FROM items WHERE is_active = 1) \
             GROUP BY band",
            bands.case_sql()
        ),
        Params::Positional(bands.values()),
        |row| {
            Ok((
                rows::int(row, 0, "band")?,
                rows::int_or_zero(row, 1, "count")?,
                rows::int_or_zero(row, 2, "total_value")?,
            ))
        },
    )
    .await?;

    Ok(FinancialAnalytics {
        total_inventory_value: money::from_cents(totals.value_cents),
        total_items: totals.items,
        average_item_price: money::from_avg_cents(totals.avg_cents),
        highest_price: money::from_cents(totals.max_cents),
        lowest_price: money::from_cents(totals.min_cents),
        most_expensive,
        least_expensive,
        price_distribution: distribution(bands, &band_rows),
    })
}

/// Expand grouped `(band, count, value_cents)` rows so every band appears,
/// empty ones with zeros.
pub fn distribution(bands: &PriceBands, grouped: &[(i64, i64, i64)]) -> Vec<PriceBandSummary> {
    bands
        .labels()
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let (count, value_cents) = grouped
                .iter()
                .find(|(band, _, _)| *band == index as i64)
                .map(|(_, count, value)| (*count, *value))
                .unwrap_or((0, 0));
            PriceBandSummary {
                range: label.clone(),
                count,
                total_value: money::from_cents(value_cents),
            }
        })
        .collect()
}
