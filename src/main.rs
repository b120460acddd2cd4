use clap::{Parser, Subcommand};
use justoo_inventory::analytics;
use justoo_inventory::config::Config;
use justoo_inventory::db::DatabaseManager;
use justoo_inventory::logging;
use justoo_inventory::metrics;
use justoo_inventory::server::{self, AppState};
use justoo_inventory::storage::{DatabaseStorage, ItemStore};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "justoo-inventory")]
#[command(about = "Inventory administration and analytics API for Justoo")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Directory for the rotating JSON log
    #[arg(long, default_value = "logs")]
    log_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrations and start the HTTP API
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply database migrations and exit
    Migrate,
    /// Print the inventory analytics report as JSON
    Analytics,
}

async fn connect(config: &Config) -> anyhow::Result<Arc<DatabaseManager>> {
    let db = DatabaseManager::new(&config.database).await?;
    db.run_migrations().await?;
    Ok(Arc::new(db))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = logging::init_logging(&cli.log_dir);

    let mut config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if config.metrics.enabled {
                metrics::init_metrics(config.metrics.port);
            }

            let db = connect(&config).await?;
            let store: Arc<dyn ItemStore> = Arc::new(DatabaseStorage::new(db.clone()));
            let state = AppState {
                store,
                db,
                config: Arc::new(config),
            };
            server::start_server(state).await?;
        }
        Commands::Migrate => {
            connect(&config).await?;
            info!("Migrations applied");
        }
        Commands::Analytics => {
            let db = connect(&config).await?;
            let report = analytics::inventory_analytics(&db, &config.analytics).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
