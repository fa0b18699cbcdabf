//! Workforce engine HTTP server.
//!
//! Reads configuration from `WORKFORCE_CONFIG_DIR` (default
//! `./config/default`), seeds the store from `seed.yaml` in that directory
//! when present, and listens on `WORKFORCE_BIND_ADDR` (default
//! `0.0.0.0:8080`). Log filtering follows `RUST_LOG`.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use workforce_engine::api::{AppState, create_router};
use workforce_engine::config::ConfigLoader;
use workforce_engine::store::{Database, Seed};

const DEFAULT_CONFIG_DIR: &str = "./config/default";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_dir = PathBuf::from(
        std::env::var("WORKFORCE_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string()),
    );
    let bind_addr =
        std::env::var("WORKFORCE_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir)?;
    let seed_path = config_dir.join("seed.yaml");
    let db = if seed_path.exists() {
        let seed = Seed::load(&seed_path)?;
        info!(
            path = %seed_path.display(),
            employees = seed.employees.len(),
            tools = seed.tools.len(),
            timesheets = seed.timesheets.len(),
            "Loaded seed data"
        );
        Database::from_seed(seed)?
    } else {
        Database::new()
    };

    let router = create_router(AppState::with_database(config, Arc::new(db)));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, config_dir = %config_dir.display(), "Workforce engine listening");
    axum::serve(listener, router).await?;
    Ok(())
}
