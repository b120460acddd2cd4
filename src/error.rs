use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Wrap a driver error with the operation that produced it.
    pub fn database(context: &str, err: impl std::fmt::Display) -> Self {
        AppError::Database {
            message: format!("{context}: {err}"),
        }
    }

    /// Turns a unique-constraint failure reported by the driver into a
    /// [`AppError::Conflict`]; every other error passes through unchanged.
    pub fn on_unique_violation(self, conflict_message: &str) -> Self {
        match self {
            AppError::Database { message } if message.contains("UNIQUE constraint failed") => {
                AppError::Conflict(conflict_message.to_string())
            }
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_conflict() {
        let err = AppError::database(
            "Failed to read row",
            "SQLite failure: `UNIQUE constraint failed: items.sku`",
        )
        .on_unique_violation("An item with this SKU already exists");
        assert!(matches!(err, AppError::Conflict(ref m) if m == "An item with this SKU already exists"));
    }

    #[test]
    fn other_failures_pass_through() {
        let err = AppError::database("Failed to insert item", "disk I/O error")
            .on_unique_violation("dup");
        assert_eq!(
            err.to_string(),
            "Database error: Failed to insert item: disk I/O error"
        );
    }
}
