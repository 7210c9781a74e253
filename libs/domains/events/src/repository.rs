use async_trait::async_trait;
use uuid::Uuid;

use crate::error::EventResult;
use crate::models::{CreateEvent, Event, Pagination, UpdateEvent};

/// Repository trait for event persistence
///
/// This trait defines the data access interface for events.
/// Implementations can use different storage backends (MongoDB, etc.)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Store a new event
    async fn create(&self, input: CreateEvent) -> EventResult<Event>;

    /// Store multiple events in a single insert
    async fn create_batch(&self, inputs: Vec<CreateEvent>) -> EventResult<Vec<Event>>;

    /// Get an event by ID
    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Event>>;

    /// List events for one page, newest change first
    async fn list(&self, pagination: &Pagination) -> EventResult<Vec<Event>>;

    /// Total number of events
    async fn count(&self) -> EventResult<u64>;

    /// Update an existing event
    async fn update(&self, id: Uuid, input: UpdateEvent) -> EventResult<Event>;

    /// Delete an event and remove every review referencing it from all users
    async fn delete(&self, id: Uuid) -> EventResult<bool>;
}
