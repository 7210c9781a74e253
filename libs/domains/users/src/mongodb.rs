//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    Collection, Database,
    bson::{Bson, Document, doc, from_bson, to_bson},
    options::ReturnDocument,
};
use std::collections::HashSet;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, Pagination, UpdateUser, User};
use crate::repository::UserRepository;

/// Counter document id for user id allocation
const USER_ID_COUNTER: &str = "user_id";

/// MongoDB implementation of the UserRepository
///
/// Besides the typed `users` collection this repository holds:
/// - an untyped `events` handle, used to verify referenced events exist
///   before accepting review writes;
/// - a `counters` handle backing the atomic integer id allocator.
pub struct MongoUserRepository {
    collection: Collection<User>,
    events: Collection<Document>,
    counters: Collection<Document>,
}

impl MongoUserRepository {
    /// Create a new MongoUserRepository
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<User>("users"),
            events: db.collection::<Document>("events"),
            counters: db.collection::<Document>("counters"),
        }
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<User> {
        &self.collection
    }

    /// Allocate the next user id from the counter document.
    ///
    /// `$inc` on a single document is atomic on the server, so concurrent
    /// creations can never observe the same id.
    async fn next_id(&self) -> UserResult<i64> {
        let counter = self
            .counters
            .find_one_and_update(
                doc! { "_id": USER_ID_COUNTER },
                doc! { "$inc": { "seq": 1_i64 } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| {
                UserError::Internal("user id counter returned no document".to_string())
            })?;

        counter
            .get_i64("seq")
            .map_err(|e| UserError::Internal(format!("malformed user id counter: {}", e)))
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, input), fields(user_name = %input.name))]
    async fn create(&self, input: CreateUser) -> UserResult<User> {
        let id = self.next_id().await?;
        let user = User::new(id, input);

        self.collection.insert_one(&user).await?;

        tracing::info!(user_id = user.id, "User created successfully");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let user = self.collection.find_one(doc! { "_id": id }).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list(&self, pagination: &Pagination) -> UserResult<Vec<User>> {
        use futures_util::TryStreamExt;

        let options = mongodb::options::FindOptions::builder()
            .limit(pagination.limit)
            .skip(pagination.skip())
            .sort(doc! { "_id": 1 })
            .build();

        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        let users: Vec<User> = cursor.try_collect().await?;

        Ok(users)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> UserResult<u64> {
        let count = self.collection.count_documents(doc! {}).await?;
        Ok(count)
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: i64, input: UpdateUser) -> UserResult<User> {
        let filter = doc! { "_id": id };
        let existing = self
            .collection
            .find_one(filter.clone())
            .await?
            .ok_or(UserError::NotFound(id))?;

        let mut updated = existing;
        updated.apply_update(input);

        self.collection.replace_one(filter, &updated).await?;

        tracing::info!(user_id = id, "User updated successfully");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> UserResult<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;

        if result.deleted_count == 0 {
            return Err(UserError::NotFound(id));
        }

        tracing::info!(user_id = id, "User deleted successfully");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn upsert_review(
        &self,
        user_id: i64,
        event_id: Uuid,
        rating: f64,
        rated_at: DateTime<Utc>,
    ) -> UserResult<()> {
        let event_bson = to_bson(&event_id)?;
        let rated_at_bson = to_bson(&rated_at)?;

        // In-place update when a review for this event already exists
        let result = self
            .collection
            .update_one(
                doc! { "_id": user_id, "reviews.event_id": event_bson.clone() },
                doc! { "$set": {
                    "reviews.$.rating": rating,
                    "reviews.$.rated_at": rated_at_bson.clone(),
                } },
            )
            .await?;

        if result.matched_count == 0 {
            // No existing review: append one
            let result = self
                .collection
                .update_one(
                    doc! { "_id": user_id },
                    doc! { "$push": { "reviews": {
                        "event_id": event_bson,
                        "rating": rating,
                        "rated_at": rated_at_bson,
                    } } },
                )
                .await?;

            if result.matched_count == 0 {
                return Err(UserError::NotFound(user_id));
            }
            tracing::info!(user_id, %event_id, "Review appended");
        } else {
            tracing::info!(user_id, %event_id, "Review updated in place");
        }

        Ok(())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn missing_events(&self, ids: &[Uuid]) -> UserResult<Vec<Uuid>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let bson_ids: Vec<Bson> = ids
            .iter()
            .map(|id| to_bson(id).unwrap_or(Bson::Null))
            .collect();

        let existing = self
            .events
            .distinct("_id", doc! { "_id": { "$in": bson_ids } })
            .await?;

        let existing: HashSet<Uuid> = existing
            .into_iter()
            .filter_map(|b| from_bson(b).ok())
            .collect();

        let mut missing: Vec<Uuid> = ids
            .iter()
            .filter(|id| !existing.contains(id))
            .copied()
            .collect();
        missing.dedup();

        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Review};

    // Integration tests would require a MongoDB instance.
    // These verify the document shapes the repository relies on.

    #[test]
    fn test_user_document_stores_reviews_array() {
        let user = User {
            id: 1,
            name: "Ada".to_string(),
            gender: Gender::F,
            age: 36,
            occupation: "engineer".to_string(),
            reviews: vec![Review {
                event_id: Uuid::now_v7(),
                rating: 4.5,
                rated_at: Utc::now(),
            }],
        };

        let doc = mongodb::bson::to_document(&user).unwrap();
        let reviews = doc.get_array("reviews").unwrap();
        assert_eq!(reviews.len(), 1);

        let review = reviews[0].as_document().unwrap();
        assert!(review.contains_key("event_id"));
        assert!(review.contains_key("rating"));
        assert!(review.contains_key("rated_at"));
    }

    #[test]
    fn test_rated_at_serializes_as_sortable_string() {
        // Time-window queries compare rated_at lexicographically, which is
        // only valid if BSON stores RFC 3339 UTC strings.
        let earlier = to_bson(&"2024-06-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()).unwrap();
        let later = to_bson(&"2024-06-02T00:00:00Z".parse::<DateTime<Utc>>().unwrap()).unwrap();

        match (earlier, later) {
            (Bson::String(a), Bson::String(b)) => assert!(a < b),
            other => panic!("expected string encoding, got {:?}", other),
        }
    }
}
