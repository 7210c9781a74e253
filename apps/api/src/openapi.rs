//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Event Review API",
        version = "0.1.0",
        description = "MongoDB-based REST API over inspection events, users, and review statistics",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/events", api = domain_events::ApiDoc),
        (path = "/api/users", api = domain_users::ApiDoc),
        (path = "/api/reports", api = domain_reports::ApiDoc)
    ),
    tags(
        (name = "Events", description = "Inspection event management endpoints (MongoDB)"),
        (name = "Users", description = "User and review management endpoints (MongoDB)"),
        (name = "Reports", description = "Rating and activity statistics")
    )
)]
pub struct ApiDoc;
