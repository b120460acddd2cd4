//! Item list query composition: loosely-typed request parameters in,
//! a parameterized `SELECT`/`COUNT` pair and pagination metadata out.

use crate::config::PaginationConfig;
use crate::domain::Item;
use crate::error::{AppError, Result};
use crate::storage::rows::ITEM_COLUMNS;
use libsql::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Raw query-string parameters for `GET /items`. Everything arrives as text
/// and is validated by [`ItemQuery::from_params`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
}

/// Columns an item list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    Id,
    Sku,
    #[default]
    Name,
    Price,
    Quantity,
    MinStockLevel,
    Unit,
    Category,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

impl SortColumn {
    /// Accepts the API field names (`minStockLevel`) and the column names
    /// (`min_stock_level`).
    pub fn parse(raw: &str) -> Option<Self> {
        let column = match raw {
            "id" => SortColumn::Id,
            "sku" => SortColumn::Sku,
            "name" => SortColumn::Name,
            "price" => SortColumn::Price,
            "quantity" => SortColumn::Quantity,
            "minStockLevel" | "min_stock_level" => SortColumn::MinStockLevel,
            "unit" => SortColumn::Unit,
            "category" => SortColumn::Category,
            "isActive" | "is_active" => SortColumn::IsActive,
            "createdAt" | "created_at" => SortColumn::CreatedAt,
            "updatedAt" | "updated_at" => SortColumn::UpdatedAt,
            _ => return None,
        };
        Some(column)
    }

    /// Unknown names fall back to [`SortColumn::Name`] without an error.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            None => SortColumn::default(),
            Some(name) => SortColumn::parse(name).unwrap_or_else(|| {
                debug!(sort_by = name, "unknown sort column, falling back to name");
                SortColumn::default()
            }),
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Sku => "sku",
            SortColumn::Name => "name",
            SortColumn::Price => "price_cents",
            SortColumn::Quantity => "quantity",
            SortColumn::MinStockLevel => "min_stock_level",
            SortColumn::Unit => "unit",
            SortColumn::Category => "category",
            SortColumn::IsActive => "is_active",
            SortColumn::CreatedAt => "created_at",
            SortColumn::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only `desc` (any case) sorts descending.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw {
            Some(order) if order.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A validated item list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemQuery {
    pub page: u32,
    pub limit: u32,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub sort_by: SortColumn,
    pub sort_order: SortOrder,
    pub search: Option<String>,
}

impl Default for ItemQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: PaginationConfig::default().default_limit,
            category: None,
            is_active: None,
            sort_by: SortColumn::default(),
            sort_order: SortOrder::default(),
            search: None,
        }
    }
}

fn non_blank(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn positive_int(raw: &str, field: &str) -> Result<u32> {
    match raw.parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(AppError::Validation(format!(
            "{field} must be a positive integer, got '{raw}'"
        ))),
    }
}

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'`.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl ItemQuery {
    pub fn from_params(params: &ItemListParams, pagination: &PaginationConfig) -> Result<Self> {
        let page = match non_blank(&params.page) {
            Some(raw) => positive_int(raw, "page")?,
            None => 1,
        };

        let limit = match non_blank(&params.limit) {
            Some(raw) => positive_int(raw, "limit")?.min(pagination.max_limit),
            None => pagination.default_limit,
        };

        let is_active = match non_blank(&params.is_active) {
            Some("1") => Some(true),
            Some("0") => Some(false),
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "isActive must be 0 or 1, got '{other}'"
                )))
            }
            None => None,
        };

        Ok(Self {
            page,
            limit,
            category: non_blank(&params.category).map(str::to_string),
            is_active,
            sort_by: SortColumn::parse_or_default(non_blank(&params.sort_by)),
            sort_order: SortOrder::parse_or_default(non_blank(&params.sort_order)),
            search: non_blank(&params.search).map(str::to_string),
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// `WHERE` clause (empty when unfiltered) and its bound values. Filters
    /// are ANDed.
    pub fn where_clause(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(category) = &self.category {
            conditions.push("category = ?");
            values.push(Value::Text(category.clone()));
        }

        if let Some(active) = self.is_active {
            conditions.push("is_active = ?");
            values.push(Value::Integer(i64::from(active)));
        }

        if let Some(search) = &self.search {
            // LIKE folds case for ASCII only; "Ämul" will not match "ämul"
            conditions.push("name LIKE ? ESCAPE '\\'");
            values.push(Value::Text(format!("%{}%", escape_like(search))));
        }

        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), values)
        }
    }

    pub fn select_sql(&self) -> (String, Vec<Value>) {
        let (where_clause, mut values) = self.where_clause();
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items{where_clause} ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
            self.sort_by.sql(),
            self.sort_order.sql(),
        );
        values.push(Value::Integer(i64::from(self.limit)));
        values.push(Value::Integer(self.offset() as i64));
        (sql, values)
    }

    pub fn count_sql(&self) -> (String, Vec<Value>) {
        let (where_clause, values) = self.where_clause();
        (format!("SELECT COUNT(*) FROM items{where_clause}"), values)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total_items: u64) -> Self {
        let limit = u64::from(limit.max(1));
        Self {
            current_page: page,
            total_pages: total_items.div_ceil(limit),
            total_items,
            has_next: u64::from(page) * limit < total_items,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub pagination: Pagination,
}
