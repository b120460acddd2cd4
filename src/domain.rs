use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit of measure an item is sold in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Grams,
    Ml,
    Litre,
    Pieces,
    Dozen,
    Packet,
    Bottle,
    Can,
}

impl Unit {
    pub const ALL: [Unit; 9] = [
        Unit::Kg,
        Unit::Grams,
        Unit::Ml,
        Unit::Litre,
        Unit::Pieces,
        Unit::Dozen,
        Unit::Packet,
        Unit::Bottle,
        Unit::Can,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Grams => "grams",
            Unit::Ml => "ml",
            Unit::Litre => "litre",
            Unit::Pieces => "pieces",
            Unit::Dozen => "dozen",
            Unit::Packet => "packet",
            Unit::Bottle => "bottle",
            Unit::Can => "can",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .iter()
            .copied()
            .find(|u| u.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Unit::ALL.iter().map(|u| u.as_str()).collect();
                format!("Invalid unit '{}'. Valid units: {}", s, valid.join(", "))
            })
    }
}

/// Order lifecycle states. Orders are owned by the order-placement
/// subsystem; this service only reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Placed,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

/// One stocked product.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub sku: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i64,
    pub min_stock_level: i64,
    pub unit: Unit,
    pub category: Option<String>,
    #[serde(with = "active_flag")]
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Validated input for creating an item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price_cents: i64,
    pub quantity: i64,
    pub min_stock_level: i64,
    pub unit: Unit,
    pub category: Option<String>,
}

/// Validated partial update; `None` leaves the column untouched. The
/// nullable text columns use `Some(None)` to clear the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub sku: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub price_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub min_stock_level: Option<i64>,
    pub unit: Option<Unit>,
    pub category: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        *self == ItemChanges::default()
    }
}

/// Counts shown on the inventory dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_items: i64,
    pub in_stock_items: i64,
    pub out_of_stock_items: i64,
    pub low_stock_items: i64,
    pub total_inventory_value: Decimal,
}

/// Prices are kept as integer minor units (paise/cents) in the database.
pub mod money {
    use super::*;

    pub fn from_cents(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    /// Rounds to two decimal places first, like a `decimal(10, 2)` column.
    /// `None` when the amount does not fit.
    pub fn to_cents(amount: Decimal) -> Option<i64> {
        amount
            .round_dp(2)
            .checked_mul(Decimal::ONE_HUNDRED)?
            .to_i64()
    }

    /// Converts an averaged minor-unit amount (SQL `AVG`) to a 2dp price.
    pub fn from_avg_cents(avg_cents: f64) -> Decimal {
        if !avg_cents.is_finite() {
            return from_cents(0);
        }
        from_cents(avg_cents.round() as i64)
    }
}

/// Parses timestamps as written by the migrations (RFC 3339) and by SQLite's
/// `datetime()` (`YYYY-MM-DD HH:MM:SS`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// The active flag travels as `1`/`0` on the wire.
pub mod active_flag {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagRepr {
        Int(i64),
        Bool(bool),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match FlagRepr::deserialize(deserializer)? {
            FlagRepr::Bool(b) => Ok(b),
            FlagRepr::Int(0) => Ok(false),
            FlagRepr::Int(1) => Ok(true),
            FlagRepr::Int(n) => Err(D::Error::custom(format!(
                "isActive must be 0 or 1, got {n}"
            ))),
        }
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<bool>, D::Error> {
            match Option::<FlagRepr>::deserialize(deserializer)? {
                None => Ok(None),
                Some(FlagRepr::Bool(b)) => Ok(Some(b)),
                Some(FlagRepr::Int(0)) => Ok(Some(false)),
                Some(FlagRepr::Int(1)) => Ok(Some(true)),
                Some(FlagRepr::Int(n)) => Err(D::Error::custom(format!(
                    "isActive must be 0 or 1, got {n}"
                ))),
            }
        }
    }
}
