use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain_events::Event;
use domain_users::User;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ReportResult;
use crate::models::{
    FiveStarEvent, MostRatedEvent, RatingAggregate, SortOrder, TopRatedEvent, TopReviewer,
    TrendingEvent,
};

/// Repository trait for the reporting queries
///
/// Every method is a read-only aggregation over the `users` collection's
/// embedded reviews, joined against `events` where event details are needed.
/// Implementations push the whole computation into the store - one pipeline
/// per query, never fetch-all-then-filter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Events ranked by mean rating, best first.
    ///
    /// Ties break deterministically: review count descending, then event id
    /// ascending. Events with zero reviews never appear.
    async fn top_rated(&self, limit: i64) -> ReportResult<Vec<TopRatedEvent>>;

    /// Events ranked by how many reviews they have, in the given direction
    async fn most_rated(&self, order: SortOrder) -> ReportResult<Vec<MostRatedEvent>>;

    /// Events ranked by their number of exact 5.0 ratings, descending
    async fn five_star_counts(&self) -> ReportResult<Vec<FiveStarEvent>>;

    /// Events ranked by reviews rated at or after `since`, descending
    async fn trending(&self, since: DateTime<Utc>) -> ReportResult<Vec<TrendingEvent>>;

    /// All events whose county matches case-insensitively after trimming
    async fn events_in_county(&self, county: &str) -> ReportResult<Vec<Event>>;

    /// Mean rating and review count per event, for the given event ids.
    /// Events without reviews have no entry.
    async fn rating_stats_for(
        &self,
        event_ids: &[Uuid],
    ) -> ReportResult<HashMap<Uuid, RatingAggregate>>;

    /// Mean rating and review count of one event, if it has any reviews
    async fn rating_stats(&self, event_id: Uuid) -> ReportResult<Option<RatingAggregate>>;

    /// Users with at least one review rated inside [start, end)
    async fn users_active_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ReportResult<Vec<User>>;

    /// Events with at least one review rated inside [start, end)
    async fn events_reviewed_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ReportResult<Vec<Event>>;

    /// The `limit` users with the most reviews, descending
    async fn most_active_users(&self, limit: i64) -> ReportResult<Vec<TopReviewer>>;

    /// Total number of users
    async fn user_count(&self) -> ReportResult<u64>;

    /// Fetch one user by id
    async fn get_user(&self, id: i64) -> ReportResult<Option<User>>;

    /// Fetch the events with the given ids (order unspecified)
    async fn events_by_ids(&self, ids: &[Uuid]) -> ReportResult<Vec<Event>>;
}
