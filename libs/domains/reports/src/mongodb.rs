//! MongoDB implementation of ReportRepository
//!
//! Each query is one aggregation pipeline over the `users` collection,
//! unwinding the embedded `reviews` array and joining `events` back in with
//! `$lookup` where event details are part of the output. The county and
//! by-year reports pair one pipeline with one targeted `find` on `events`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_events::Event;
use domain_users::User;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database,
    bson::{Bson, Document, doc, to_bson},
};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ReportResult;
use crate::models::{
    FiveStarEvent, MostRatedEvent, RatingAggregate, SortOrder, TopRatedEvent, TopReviewer,
    TrendingEvent, round2,
};
use crate::repository::ReportRepository;

/// MongoDB implementation of the ReportRepository
pub struct MongoReportRepository {
    users: Collection<User>,
    events: Collection<Event>,
}

/// Pipeline row: review group joined with its event
#[derive(Debug, Deserialize)]
struct RatedRow {
    avg_rating: f64,
    review_count: i64,
    event: Event,
}

/// Pipeline row: review count joined with its event
#[derive(Debug, Deserialize)]
struct CountRow {
    review_count: i64,
    event: Event,
}

/// Pipeline row: per-event mean and count, keyed by the grouped event id
#[derive(Debug, Deserialize)]
struct StatsRow {
    #[serde(rename = "_id")]
    event_id: Uuid,
    avg: f64,
    count: i64,
}

/// Pipeline row: bare grouped event id
#[derive(Debug, Deserialize)]
struct IdRow {
    #[serde(rename = "_id")]
    event_id: Uuid,
}

/// Pipeline row: user document with its computed review count
#[derive(Debug, Deserialize)]
struct ReviewerRow {
    #[serde(flatten)]
    user: User,
    review_count: i64,
}

impl MongoReportRepository {
    /// Create a new MongoReportRepository
    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection::<User>("users"),
            events: db.collection::<Event>("events"),
        }
    }

    /// Lookup stage joining the grouped event id back to the event document
    fn lookup_event() -> Vec<Document> {
        vec![
            doc! { "$lookup": {
                "from": "events",
                "localField": "_id",
                "foreignField": "_id",
                "as": "event",
            } },
            doc! { "$unwind": "$event" },
        ]
    }

    /// Anchored, escaped, case-insensitive filter on the county field
    fn county_filter(county: &str) -> Document {
        let pattern = format!("^{}$", regex::escape(county));
        doc! { "county": { "$regex": pattern, "$options": "i" } }
    }

    /// Filter matching reviews rated inside [start, end)
    fn rated_between(start: &Bson, end: &Bson) -> Document {
        doc! { "$gte": start.clone(), "$lt": end.clone() }
    }
}

#[async_trait]
impl ReportRepository for MongoReportRepository {
    #[instrument(skip(self))]
    async fn top_rated(&self, limit: i64) -> ReportResult<Vec<TopRatedEvent>> {
        let mut pipeline = vec![
            doc! { "$unwind": "$reviews" },
            doc! { "$group": {
                "_id": "$reviews.event_id",
                "avg_rating": { "$avg": "$reviews.rating" },
                "review_count": { "$sum": 1 },
            } },
            // Deterministic order for equal means: more reviews first, then id
            doc! { "$sort": { "avg_rating": -1, "review_count": -1, "_id": 1 } },
            doc! { "$limit": limit },
        ];
        pipeline.extend(Self::lookup_event());
        pipeline.push(doc! { "$project": { "event": 1, "avg_rating": 1, "review_count": 1 } });

        let rows: Vec<RatedRow> = self
            .users
            .aggregate(pipeline)
            .with_type::<RatedRow>()
            .await?
            .try_collect()
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopRatedEvent {
                event: row.event,
                average_score: round2(row.avg_rating),
                reviews_count: row.review_count.max(0) as u64,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn most_rated(&self, order: SortOrder) -> ReportResult<Vec<MostRatedEvent>> {
        let mut pipeline = vec![
            doc! { "$unwind": "$reviews" },
            doc! { "$group": {
                "_id": "$reviews.event_id",
                "review_count": { "$sum": 1 },
            } },
            doc! { "$sort": { "review_count": order.as_mongo(), "_id": 1 } },
        ];
        pipeline.extend(Self::lookup_event());
        pipeline.push(doc! { "$project": { "event": 1, "review_count": 1 } });

        let rows: Vec<CountRow> = self
            .users
            .aggregate(pipeline)
            .with_type::<CountRow>()
            .await?
            .try_collect()
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| MostRatedEvent {
                event: row.event,
                reviews_count: row.review_count.max(0) as u64,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn five_star_counts(&self) -> ReportResult<Vec<FiveStarEvent>> {
        let mut pipeline = vec![
            doc! { "$unwind": "$reviews" },
            // Exact 5.0 ratings only
            doc! { "$match": { "reviews.rating": 5.0 } },
            doc! { "$group": {
                "_id": "$reviews.event_id",
                "review_count": { "$sum": 1 },
            } },
            doc! { "$sort": { "review_count": -1, "_id": 1 } },
        ];
        pipeline.extend(Self::lookup_event());
        pipeline.push(doc! { "$project": { "event": 1, "review_count": 1 } });

        let rows: Vec<CountRow> = self
            .users
            .aggregate(pipeline)
            .with_type::<CountRow>()
            .await?
            .try_collect()
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| FiveStarEvent {
                event: row.event,
                five_stars_count: row.review_count.max(0) as u64,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn trending(&self, since: DateTime<Utc>) -> ReportResult<Vec<TrendingEvent>> {
        let since_bson = to_bson(&since)?;
        let mut pipeline = vec![
            doc! { "$unwind": "$reviews" },
            // Lower bound inclusive
            doc! { "$match": { "reviews.rated_at": { "$gte": since_bson } } },
            doc! { "$group": {
                "_id": "$reviews.event_id",
                "review_count": { "$sum": 1 },
            } },
            doc! { "$sort": { "review_count": -1, "_id": 1 } },
        ];
        pipeline.extend(Self::lookup_event());
        pipeline.push(doc! { "$project": { "event": 1, "review_count": 1 } });

        let rows: Vec<CountRow> = self
            .users
            .aggregate(pipeline)
            .with_type::<CountRow>()
            .await?
            .try_collect()
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| TrendingEvent {
                event: row.event,
                recent_review_count: row.review_count.max(0) as u64,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn events_in_county(&self, county: &str) -> ReportResult<Vec<Event>> {
        let cursor = self.events.find(Self::county_filter(county)).await?;
        let events: Vec<Event> = cursor.try_collect().await?;
        Ok(events)
    }

    #[instrument(skip(self, event_ids), fields(count = event_ids.len()))]
    async fn rating_stats_for(
        &self,
        event_ids: &[Uuid],
    ) -> ReportResult<HashMap<Uuid, RatingAggregate>> {
        if event_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<Bson> = event_ids
            .iter()
            .map(|id| to_bson(id).unwrap_or(Bson::Null))
            .collect();

        let pipeline = vec![
            doc! { "$unwind": "$reviews" },
            doc! { "$match": { "reviews.event_id": { "$in": ids } } },
            doc! { "$group": {
                "_id": "$reviews.event_id",
                "avg": { "$avg": "$reviews.rating" },
                "count": { "$sum": 1 },
            } },
        ];

        let rows: Vec<StatsRow> = self
            .users
            .aggregate(pipeline)
            .with_type::<StatsRow>()
            .await?
            .try_collect()
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.event_id,
                    RatingAggregate {
                        avg: row.avg,
                        count: row.count.max(0) as u64,
                    },
                )
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn rating_stats(&self, event_id: Uuid) -> ReportResult<Option<RatingAggregate>> {
        let id_bson = to_bson(&event_id)?;
        let pipeline = vec![
            doc! { "$unwind": "$reviews" },
            doc! { "$match": { "reviews.event_id": id_bson } },
            doc! { "$group": {
                "_id": "$reviews.event_id",
                "avg": { "$avg": "$reviews.rating" },
                "count": { "$sum": 1 },
            } },
        ];

        let rows: Vec<StatsRow> = self
            .users
            .aggregate(pipeline)
            .with_type::<StatsRow>()
            .await?
            .try_collect()
            .await?;

        Ok(rows.into_iter().next().map(|row| RatingAggregate {
            avg: row.avg,
            count: row.count.max(0) as u64,
        }))
    }

    #[instrument(skip(self))]
    async fn users_active_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ReportResult<Vec<User>> {
        let start_bson = to_bson(&start)?;
        let end_bson = to_bson(&end)?;

        let filter = doc! { "reviews": { "$elemMatch": {
            "rated_at": Self::rated_between(&start_bson, &end_bson),
        } } };

        let options = mongodb::options::FindOptions::builder()
            .sort(doc! { "_id": 1 })
            .build();

        let cursor = self.users.find(filter).with_options(options).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn events_reviewed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ReportResult<Vec<Event>> {
        let start_bson = to_bson(&start)?;
        let end_bson = to_bson(&end)?;

        let pipeline = vec![
            doc! { "$unwind": "$reviews" },
            doc! { "$match": {
                "reviews.rated_at": Self::rated_between(&start_bson, &end_bson),
            } },
            doc! { "$group": { "_id": "$reviews.event_id" } },
        ];

        let rows: Vec<IdRow> = self
            .users
            .aggregate(pipeline)
            .with_type::<IdRow>()
            .await?
            .try_collect()
            .await?;

        let ids: Vec<Uuid> = rows.into_iter().map(|row| row.event_id).collect();
        self.events_by_ids(&ids).await
    }

    #[instrument(skip(self))]
    async fn most_active_users(&self, limit: i64) -> ReportResult<Vec<TopReviewer>> {
        let pipeline = vec![
            doc! { "$addFields": {
                "review_count": { "$size": { "$ifNull": ["$reviews", []] } },
            } },
            doc! { "$sort": { "review_count": -1, "_id": 1 } },
            doc! { "$limit": limit },
        ];

        let rows: Vec<ReviewerRow> = self
            .users
            .aggregate(pipeline)
            .with_type::<ReviewerRow>()
            .await?
            .try_collect()
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopReviewer {
                user: row.user,
                review_count: row.review_count.max(0) as u64,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn user_count(&self) -> ReportResult<u64> {
        let count = self.users.count_documents(doc! {}).await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: i64) -> ReportResult<Option<User>> {
        let user = self.users.find_one(doc! { "_id": id }).await?;
        Ok(user)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn events_by_ids(&self, ids: &[Uuid]) -> ReportResult<Vec<Event>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let bson_ids: Vec<Bson> = ids
            .iter()
            .map(|id| to_bson(id).unwrap_or(Bson::Null))
            .collect();

        let cursor = self
            .events
            .find(doc! { "_id": { "$in": bson_ids } })
            .await?;
        let events: Vec<Event> = cursor.try_collect().await?;
        Ok(events)
    }
}
