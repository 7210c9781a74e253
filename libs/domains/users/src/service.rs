//! User service - business logic layer

use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, Pagination, RateEvent, UpdateUser, User, UserPage};
use crate::repository::UserRepository;

/// User service providing business logic operations
///
/// The service layer handles validation, the referential check on reviewed
/// events, and orchestrates repository operations.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new UserService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Verify that every referenced event exists, rejecting the write otherwise
    async fn check_referenced_events(&self, ids: Vec<Uuid>) -> UserResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let missing = self.repository.missing_events(&ids).await?;
        if let Some(first) = missing.first() {
            return Err(UserError::Validation(format!(
                "referenced event not found: {}",
                first
            )));
        }
        Ok(())
    }

    /// Create a new user with an allocated integer id
    #[instrument(skip(self, input), fields(user_name = %input.name))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let referenced: Vec<Uuid> = input.reviews.iter().map(|r| r.event_id).collect();
        self.check_referenced_events(referenced).await?;

        self.repository.create(input).await
    }

    /// Get a user by ID
    #[instrument(skip(self))]
    pub async fn get_user(&self, id: i64) -> UserResult<User> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// List users with page-based pagination
    #[instrument(skip(self))]
    pub async fn list_users(&self, pagination: Pagination) -> UserResult<UserPage> {
        let pagination = pagination.normalized();
        let items = self.repository.list(&pagination).await?;
        let total = self.repository.count().await?;

        Ok(UserPage {
            page: pagination.page,
            limit: pagination.limit,
            total,
            items,
        })
    }

    /// Update an existing user
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: i64, input: UpdateUser) -> UserResult<User> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        if let Some(reviews) = &input.reviews {
            let referenced: Vec<Uuid> = reviews.iter().map(|r| r.event_id).collect();
            self.check_referenced_events(referenced).await?;
        }

        self.repository.update(id, input).await
    }

    /// Delete a user
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i64) -> UserResult<()> {
        self.repository.delete(id).await?;
        Ok(())
    }

    /// Add or update this user's review of an event.
    ///
    /// Updates the review in place when one exists for the event, otherwise
    /// appends one, keeping at most one review per (user, event) pair.
    #[instrument(skip(self, input))]
    pub async fn rate_event(
        &self,
        user_id: i64,
        event_id: Uuid,
        input: RateEvent,
    ) -> UserResult<()> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        // The referenced event must exist before the review is accepted
        let missing = self.repository.missing_events(&[event_id]).await?;
        if !missing.is_empty() {
            return Err(UserError::EventNotFound(event_id));
        }

        let rated_at = input.rated_at.unwrap_or_else(Utc::now);
        self.repository
            .upsert_review(user_id, event_id, input.rating, rated_at)
            .await
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
