use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::UserResult;
use crate::models::{CreateUser, Pagination, UpdateUser, User};

/// Repository trait for user persistence
///
/// This trait defines the data access interface for users and their
/// embedded reviews. Implementations can use different storage backends
/// (MongoDB, etc.)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user, allocating the next integer id
    async fn create(&self, input: CreateUser) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>>;

    /// List users for one page, ascending by id
    async fn list(&self, pagination: &Pagination) -> UserResult<Vec<User>>;

    /// Total number of users
    async fn count(&self) -> UserResult<u64>;

    /// Update an existing user
    async fn update(&self, id: i64, input: UpdateUser) -> UserResult<User>;

    /// Delete a user by ID
    async fn delete(&self, id: i64) -> UserResult<bool>;

    /// Update the review for (user, event) in place if present, else append
    async fn upsert_review(
        &self,
        user_id: i64,
        event_id: Uuid,
        rating: f64,
        rated_at: DateTime<Utc>,
    ) -> UserResult<()>;

    /// Of the given event ids, return the ones that do NOT exist
    async fn missing_events(&self, ids: &[Uuid]) -> UserResult<Vec<Uuid>>;
}
