//! MongoDB implementation of EventRepository

use async_trait::async_trait;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::IndexOptions,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{EventError, EventResult};
use crate::models::{CreateEvent, Event, Pagination, UpdateEvent};
use crate::repository::EventRepository;

/// MongoDB implementation of the EventRepository
///
/// Holds an untyped handle on the `users` collection as well: deleting an
/// event pulls every review referencing it out of the user documents.
pub struct MongoEventRepository {
    collection: Collection<Event>,
    users: Collection<Document>,
}

impl MongoEventRepository {
    /// Create a new MongoEventRepository
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Event>("events"),
            users: db.collection::<Document>("users"),
        }
    }

    /// Create a new MongoEventRepository with a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Event>(collection_name),
            users: db.collection::<Document>("users"),
        }
    }

    /// Initialize indexes for common query patterns
    pub async fn init_indexes(&self) -> EventResult<()> {
        let indexes = vec![
            // County rollups filter by county
            IndexModel::builder()
                .keys(doc! { "county": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_county".to_string())
                        .build(),
                )
                .build(),
            // Listing sorts by change date
            IndexModel::builder()
                .keys(doc! { "change_date": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_change_date".to_string())
                        .build(),
                )
                .build(),
            // Establishment lookups
            IndexModel::builder()
                .keys(doc! { "establishment_id": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_establishment_id".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Event indexes created successfully");
        Ok(())
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Event> {
        &self.collection
    }
}

#[async_trait]
impl EventRepository for MongoEventRepository {
    #[instrument(skip(self, input), fields(establishment = %input.establishment_name))]
    async fn create(&self, input: CreateEvent) -> EventResult<Event> {
        let event = Event::new(input);

        self.collection.insert_one(&event).await?;

        tracing::info!(event_id = %event.id, "Event created successfully");
        Ok(event)
    }

    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    async fn create_batch(&self, inputs: Vec<CreateEvent>) -> EventResult<Vec<Event>> {
        if inputs.is_empty() {
            return Ok(vec![]);
        }

        let events: Vec<Event> = inputs.into_iter().map(Event::new).collect();
        self.collection.insert_many(&events).await?;

        tracing::info!(count = events.len(), "Event batch created successfully");
        Ok(events)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Event>> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let event = self.collection.find_one(filter).await?;
        Ok(event)
    }

    #[instrument(skip(self))]
    async fn list(&self, pagination: &Pagination) -> EventResult<Vec<Event>> {
        use futures_util::TryStreamExt;

        let options = mongodb::options::FindOptions::builder()
            .limit(pagination.limit)
            .skip(pagination.skip())
            .sort(doc! { "change_date": -1 })
            .build();

        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        let events: Vec<Event> = cursor.try_collect().await?;

        Ok(events)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> EventResult<u64> {
        let count = self.collection.count_documents(doc! {}).await?;
        Ok(count)
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateEvent) -> EventResult<Event> {
        let filter = doc! { "_id": to_bson(&id).unwrap_or(Bson::Null) };
        let existing = self
            .collection
            .find_one(filter.clone())
            .await?
            .ok_or(EventError::NotFound(id))?;

        let mut updated = existing;
        updated.apply_update(input);

        self.collection.replace_one(filter, &updated).await?;

        tracing::info!(event_id = %id, "Event updated successfully");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> EventResult<bool> {
        let id_bson = to_bson(&id).unwrap_or(Bson::Null);
        let result = self
            .collection
            .delete_one(doc! { "_id": id_bson.clone() })
            .await?;

        if result.deleted_count == 0 {
            return Err(EventError::NotFound(id));
        }

        // Cascade: drop every review referencing the deleted event.
        // Sequential with the delete above, not transactional (best-effort).
        let pull = self
            .users
            .update_many(
                doc! {},
                doc! { "$pull": { "reviews": { "event_id": id_bson } } },
            )
            .await?;

        tracing::info!(
            event_id = %id,
            users_touched = pull.modified_count,
            "Event deleted, referencing reviews removed"
        );
        Ok(true)
    }
}
