use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use libsql::{Builder, Connection, Database};
use std::path::Path;
use tracing::info;

/// Owns the libSQL database and the connection every repository and
/// aggregator borrows. Built once at startup and handed out explicitly.
pub struct DatabaseManager {
    _db: Database,
    conn: Connection,
}

impl DatabaseManager {
    /// Connect to the database described by `config`: Turso when the url is
    /// remote, a local file otherwise.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        if config.is_remote() {
            let auth_token = config.auth_token.clone().ok_or_else(|| AppError::Database {
                message: "LIBSQL_AUTH_TOKEN environment variable not set".to_string(),
            })?;

            info!("Connecting to Turso database at {}", config.url);

            let db = Builder::new_remote(config.url.clone(), auth_token)
                .build()
                .await
                .map_err(|e| AppError::database("Failed to connect to database", e))?;

            Self::from_database(db)
        } else {
            Self::open_local(&config.url).await
        }
    }

    /// Open (creating if needed) a local database file.
    pub async fn open_local(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Opening local database at {}", path.display());

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::database("Failed to open database", e))?;

        Self::from_database(db)
    }

    fn from_database(db: Database) -> Result<Self> {
        let conn = db
            .connect()
            .map_err(|e| AppError::database("Failed to get database connection", e))?;
        Ok(Self { _db: db, conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run database migrations. Every statement is idempotent.
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let items_sql = include_str!("../migrations/001_create_items.sql");
        self.conn
            .execute_batch(items_sql)
            .await
            .map_err(|e| AppError::database("Failed to run items migration", e))?;

        let orders_sql = include_str!("../migrations/002_create_orders.sql");
        self.conn
            .execute_batch(orders_sql)
            .await
            .map_err(|e| AppError::database("Failed to run orders migration", e))?;

        let operators_sql = include_str!("../migrations/003_create_operator_tables.sql");
        self.conn
            .execute_batch(operators_sql)
            .await
            .map_err(|e| AppError::database("Failed to run operator tables migration", e))?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}
