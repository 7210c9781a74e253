//! Reports API routes
//!
//! This module wires up the reporting/aggregation domain to HTTP routes.

use axum::Router;
use domain_reports::{MongoReportRepository, ReportService, handlers};

use crate::state::AppState;

/// Create reports router
pub fn router(state: &AppState) -> Router {
    // Create the MongoDB repository
    let repository = MongoReportRepository::new(&state.db);

    // Create the service
    let service = ReportService::new(repository);

    // Return the domain's router
    handlers::router(service)
}
