//! Booking Service Library
//!
//! Availability resolution and booking orchestration for barbershops. The
//! gateway embeds this crate; it has no transport of its own.

pub mod config;
pub mod infra;
pub mod provider;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use crate::config::BookingServiceConfig;
use crate::infra::Database;
use crate::provider::SquareClient;
use crate::repository::SqlEntityStore;
use crate::service::{
    AvailabilityResolver, AvailabilityService, BookingOrchestrator, BookingService,
    PercentageDeposit,
};

/// Wired services plus the database handle used for health checks.
pub struct BookingCore {
    pub availability: Arc<dyn AvailabilityService>,
    pub booking: Arc<dyn BookingService>,
    pub database: Database,
}

/// Connect to the database (running pending migrations) and wire the
/// resolver and orchestrator against the Square client.
pub async fn build(config: &BookingServiceConfig) -> Result<BookingCore, Box<dyn std::error::Error>> {
    let database = Database::connect(&config.database).await?;

    let store = Arc::new(SqlEntityStore::new(database.get_connection()));
    let provider = Arc::new(SquareClient::new(&config.provider)?);
    let policy = Arc::new(PercentageDeposit::from(&config.deposit));

    let availability = Arc::new(AvailabilityResolver::new(store.clone(), provider.clone()));
    let booking = Arc::new(BookingOrchestrator::new(
        store,
        provider,
        policy,
        config.currency.clone(),
    ));

    info!(
        provider = %config.provider.base_url,
        currency = %config.currency,
        "Booking core ready"
    );

    Ok(BookingCore {
        availability,
        booking,
        database,
    })
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = BookingServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
