//! Users API routes
//!
//! This module wires up the users domain to HTTP routes.

use axum::Router;
use domain_users::{MongoUserRepository, UserService, handlers};

use crate::state::AppState;

/// Create users router
pub fn router(state: &AppState) -> Router {
    // Create the MongoDB repository
    let repository = MongoUserRepository::new(&state.db);

    // Create the service
    let service = UserService::new(repository);

    // Return the domain's router
    handlers::router(service)
}
