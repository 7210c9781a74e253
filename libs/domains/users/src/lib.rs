//! Users Domain
//!
//! This module provides a complete domain implementation for managing users
//! and their embedded event reviews using MongoDB.
//!
//! Reviews are not a standalone collection: each user document carries a
//! `reviews` array of `{event_id, rating, rated_at}` records. The review
//! write is an upsert - at most one review per (user, event) pair - and
//! referenced events are verified to exist before a write is accepted.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{MongoUserRepository, UserService, handlers};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("mydb");
//!
//! let repository = MongoUserRepository::new(&db);
//! let service = UserService::new(repository);
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
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateUser, Gender, Pagination, RateEvent, Review, ReviewInput, UpdateUser, User, UserPage,
};
pub use mongodb::MongoUserRepository;
pub use repository::UserRepository;
pub use service::UserService;
