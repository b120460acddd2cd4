//! JSON bodies for the item write endpoints and their validation.

use crate::domain::{active_flag, money, ItemChanges, NewItem, Unit};
use crate::error::{AppError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

const DEFAULT_MIN_STOCK_LEVEL: i64 = 10;
/// Largest price a `decimal(10, 2)` column holds, in minor units.
const MAX_PRICE_CENTS: i64 = 9_999_999_999;
/// Stock counts are 32-bit, which keeps `price * quantity` sums inside i64.
const MAX_STOCK_COUNT: i64 = i32::MAX as i64;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub min_stock_level: Option<i64>,
    pub unit: Option<String>,
    pub category: Option<String>,
}

/// Partial update. Unknown fields (including `id` and `createdAt`) are
/// ignored. `sku`, `description` and `category` are cleared by sending
/// `null` or a blank string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdateRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub sku: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub min_stock_level: Option<i64>,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "active_flag::option::deserialize")]
    pub is_active: Option<bool>,
}

/// A field that was sent, even as `null`, becomes `Some`.
fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn invalid(message: impl Into<String>) -> AppError {
    AppError::Validation(message.into())
}

fn price_cents(price: Decimal) -> Result<i64> {
    let cents = money::to_cents(price)
        .filter(|cents| *cents <= MAX_PRICE_CENTS)
        .ok_or_else(|| invalid("Price is out of range"))?;
    if cents <= 0 {
        return Err(invalid("Price must be greater than 0"));
    }
    Ok(cents)
}

fn quantity(value: i64) -> Result<i64> {
    if value < 0 {
        return Err(invalid("Quantity cannot be negative"));
    }
    if value > MAX_STOCK_COUNT {
        return Err(invalid("Quantity is out of range"));
    }
    Ok(value)
}

fn min_stock_level(value: i64) -> Result<i64> {
    if value < 0 {
        return Err(invalid("Minimum stock level cannot be negative"));
    }
    if value > MAX_STOCK_COUNT {
        return Err(invalid("Minimum stock level is out of range"));
    }
    Ok(value)
}

fn unit(raw: &str) -> Result<Unit> {
    raw.trim().parse::<Unit>().map_err(invalid)
}

/// Trimmed text, with blank treated as absent.
fn text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl NewItemRequest {
    pub fn validate(self) -> Result<NewItem> {
        let (Some(name), Some(price), Some(unit_raw)) = (text(self.name), self.price, self.unit)
        else {
            return Err(invalid("Name, price, and unit are required"));
        };

        Ok(NewItem {
            name,
            sku: text(self.sku),
            description: text(self.description),
            price_cents: price_cents(price)?,
            quantity: quantity(self.quantity.unwrap_or(0))?,
            min_stock_level: min_stock_level(
                self.min_stock_level.unwrap_or(DEFAULT_MIN_STOCK_LEVEL),
            )?,
            unit: unit(&unit_raw)?,
            category: text(self.category),
        })
    }
}

impl ItemUpdateRequest {
    pub fn validate(self) -> Result<ItemChanges> {
        let name = match self.name {
            Some(raw) => Some(text(Some(raw)).ok_or_else(|| invalid("Name cannot be blank"))?),
            None => None,
        };

        let changes = ItemChanges {
            name,
            sku: self.sku.map(text),
            description: self.description.map(text),
            price_cents: self.price.map(price_cents).transpose()?,
            quantity: self.quantity.map(quantity).transpose()?,
            min_stock_level: self.min_stock_level.map(min_stock_level).transpose()?,
            unit: self.unit.as_deref().map(unit).transpose()?,
            category: self.category.map(text),
            is_active: self.is_active,
        };

        if changes.is_empty() {
            return Err(invalid("No fields to update"));
        }
        Ok(changes)
    }
}
