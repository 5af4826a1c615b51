use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use data::Repositories;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::fixtures::read_catalog_fixture;
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::settings::{Settings, StorageBackend};
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level)?;

    let repos = match settings.storage_backend {
        StorageBackend::Postgres => {
            let database_url = settings
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let pool = create_pool(database_url, settings.database_max_connections).await?;
            run_migrations(&pool).await?;
            Repositories::postgres(pool)
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage, data is lost on restart");
            Repositories::in_memory()
        }
    };

    let jwt = Arc::new(JwtService::new(
        &settings.jwt_secret,
        settings.jwt_ttl_seconds,
    ));
    let state = AppState::new(&repos, settings.blog(), jwt);

    if let Some(path) = &settings.catalog_fixture {
        let import = read_catalog_fixture(path).await?;
        let summary = state
            .catalog_service
            .import(import)
            .await
            .context("failed to import catalog fixture")?;
        info!(
            categories = summary.categories,
            locations = summary.locations,
            "catalog ready"
        );
    }

    server::run_http(&settings, state).await
}
