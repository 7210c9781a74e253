//! Events API routes
//!
//! This module wires up the events domain to HTTP routes.

use axum::Router;
use domain_events::{EventService, MongoEventRepository, handlers};
use tracing::info;

use crate::state::AppState;

/// Create events router
pub fn router(state: &AppState) -> Router {
    // Create the MongoDB repository
    let repository = MongoEventRepository::new(&state.db);

    // Create the service
    let service = EventService::new(repository);

    // Return the domain's router
    handlers::router(service)
}

/// Initialize event indexes in MongoDB
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    let repository = MongoEventRepository::new(db);
    repository
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create event indexes: {}", e))?;
    info!("Event collection indexes created");
    Ok(())
}
