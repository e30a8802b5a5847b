//! SplitLedger API Server
//!
//! Main entry point for the group ledger service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use splitledger_api::{AppState, create_router};
use splitledger_core::ledger::{LedgerPolicy, LedgerService, LedgerStore};
use splitledger_db::{FixtureFile, InMemoryLedgerStore};
use splitledger_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "splitledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Build the record store
    let store = match &config.store.seed_file {
        Some(path) => {
            let fixtures = FixtureFile::read(path)
                .await
                .with_context(|| format!("Failed to read seed file {path}"))?;
            let store = InMemoryLedgerStore::from_fixtures(&fixtures).await?;
            info!(seed_file = %path, groups = fixtures.groups.len(), "Seeded in-memory store");
            store
        }
        None => {
            info!("Starting with an empty in-memory store");
            InMemoryLedgerStore::new()
        }
    };

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));

    let policy = LedgerPolicy::new(config.ledger.settlement_epsilon)?;
    info!(epsilon = %policy.epsilon(), "Ledger policy configured");
    let ledger = LedgerService::new(Arc::new(store) as Arc<dyn LedgerStore>, policy);

    // Create application state
    let state = AppState {
        ledger: Arc::new(ledger),
        jwt_service: Arc::new(jwt_service),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
