//! Event service - business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{EventError, EventResult};
use crate::models::{CreateEvent, Event, EventPage, Pagination, UpdateEvent};
use crate::repository::EventRepository;

/// Event service providing business logic operations
///
/// The service layer handles validation, business rules, and orchestrates
/// repository operations.
pub struct EventService<R: EventRepository> {
    repository: Arc<R>,
}

impl<R: EventRepository> EventService<R> {
    /// Create a new EventService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new event
    #[instrument(skip(self, input), fields(establishment = %input.establishment_name))]
    pub async fn create_event(&self, input: CreateEvent) -> EventResult<Event> {
        input
            .validate()
            .map_err(|e| EventError::Validation(e.to_string()))?;

        self.repository.create(input).await
    }

    /// Create multiple events in one batch
    ///
    /// Every element is validated before anything is inserted, so a bad
    /// element rejects the whole batch.
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub async fn create_events(&self, inputs: Vec<CreateEvent>) -> EventResult<Vec<Event>> {
        for (index, input) in inputs.iter().enumerate() {
            input
                .validate()
                .map_err(|e| EventError::Validation(format!("event {}: {}", index, e)))?;
        }

        self.repository.create_batch(inputs).await
    }

    /// Get an event by ID
    #[instrument(skip(self))]
    pub async fn get_event(&self, id: Uuid) -> EventResult<Event> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(EventError::NotFound(id))
    }

    /// List events with page-based pagination
    #[instrument(skip(self))]
    pub async fn list_events(&self, pagination: Pagination) -> EventResult<EventPage> {
        let pagination = pagination.normalized();
        let items = self.repository.list(&pagination).await?;
        let total = self.repository.count().await?;

        Ok(EventPage {
            page: pagination.page,
            limit: pagination.limit,
            total,
            items,
        })
    }

    /// Update an existing event
    #[instrument(skip(self, input))]
    pub async fn update_event(&self, id: Uuid, input: UpdateEvent) -> EventResult<Event> {
        input
            .validate()
            .map_err(|e| EventError::Validation(e.to_string()))?;

        self.repository.update(id, input).await
    }

    /// Delete an event (cascades to reviews referencing it)
    #[instrument(skip(self))]
    pub async fn delete_event(&self, id: Uuid) -> EventResult<()> {
        self.repository.delete(id).await?;
        Ok(())
    }
}

impl<R: EventRepository> Clone for EventService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
