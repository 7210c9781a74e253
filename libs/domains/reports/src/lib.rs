//! Reports Domain
//!
//! Read-only rating and activity statistics computed by joining the
//! `users` collection's embedded reviews against the `events` collection.
//!
//! Every query runs as a single aggregation pipeline on the store (plus at
//! most one targeted `find`), so the collections are never pulled into
//! application memory for filtering. All queries are stateless reads:
//! rerunning any of them against unchanged data yields identical output.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_reports::{MongoReportRepository, ReportService, handlers};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("mydb");
//!
//! let repository = MongoReportRepository::new(&db);
//! let service = ReportService::new(repository);
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{ReportError, ReportResult};
pub use handlers::ApiDoc;
pub use models::{
    ActiveUsers, CountyEvent, CountyRollup, EventRatingStats, FiveStarEvent, MostActiveUsers,
    MostRatedEvent, RatingAggregate, ReviewedEvents, SortOrder, TopRatedEvent, TopReviewer,
    TrendingEvent, UserTopRated,
};
pub use mongodb::MongoReportRepository;
pub use repository::ReportRepository;
pub use service::ReportService;
