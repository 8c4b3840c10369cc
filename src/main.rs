use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use commission_ledger::app::LedgerServices;
use commission_ledger::config::{Config, StorageBackend};
use commission_ledger::storage::{InMemoryLedgerStore, LedgerStore, MySqlLedgerStore};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    let json_logs = config.app.log_json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.app.log_filter().into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    config.validate().context("Configuration validation failed")?;

    tracing::info!("Starting Commission Ledger");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());
    tracing::info!(
        storage = ?config.ledger.storage,
        fee_strategy = ?config.ledger.fee_strategy,
        date_parsing = ?config.ledger.date_parsing,
        "Ledger settings"
    );

    let store: Arc<dyn LedgerStore> = match (&config.ledger.storage, &config.database) {
        (StorageBackend::MySql, Some(database)) => {
            let pool = database
                .create_pool()
                .await
                .context("Failed to create database pool")?;

            if database.run_migrations {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run migrations")?;
                tracing::info!("Database migrations applied");
            }

            tracing::info!(
                "Database pool initialized ({} connections)",
                database.pool_size
            );
            Arc::new(MySqlLedgerStore::new(pool))
        }
        (StorageBackend::MySql, None) => anyhow::bail!("MySQL storage selected without DATABASE_URL"),
        (StorageBackend::Memory, _) => {
            tracing::warn!("Using in-memory ledger storage; data is lost on restart");
            Arc::new(InMemoryLedgerStore::new())
        }
    };

    let services = LedgerServices::new(store, &config.ledger);

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(TracingLogger::default())
            .configure(move |cfg| services.configure(cfg))
    })
    .workers(config.server.workers)
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await?;
    Ok(())
}
