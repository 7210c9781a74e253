//! Report service - input validation and result assembly
//!
//! The repository owns the pipelines; this layer validates scalar inputs
//! before any query runs, captures the clock where a window is relative to
//! "now", and assembles multi-step reports (county rollup, per-user top-N).

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ReportError, ReportResult};
use crate::models::{
    ActiveUsers, CountyEvent, CountyRollup, EventRatingStats, FiveStarEvent, MostActiveUsers,
    MostRatedEvent, ReviewedEvents, SortOrder, TopRatedEvent, TrendingEvent, UserTopRated, round2,
};
use crate::repository::ReportRepository;

/// Default size of the top-rated report
const DEFAULT_TOP_LIMIT: i64 = 10;
/// Largest allowed top-rated report
const MAX_TOP_LIMIT: i64 = 100;
/// Size of the trending window in days
const TRENDING_WINDOW_DAYS: i64 = 30;
/// Size of the most-active-users report
const TOP_REVIEWERS: i64 = 5;
/// How many of a user's best reviews feed the per-user report
const BEST_RATED_PER_USER: usize = 3;

/// Report service over the aggregation repository
pub struct ReportService<R: ReportRepository> {
    repository: Arc<R>,
}

impl<R: ReportRepository> ReportService<R> {
    /// Create a new ReportService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// UTC calendar-year bounds [Jan 1 year, Jan 1 year+1)
    fn year_bounds(year: i32) -> ReportResult<(DateTime<Utc>, DateTime<Utc>)> {
        if !(1000..=9999).contains(&year) {
            return Err(ReportError::Validation(format!(
                "year must be a 4-digit number, got {}",
                year
            )));
        }

        let start = Utc
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| ReportError::Internal(format!("invalid year start for {}", year)))?;
        let end = Utc
            .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| ReportError::Internal(format!("invalid year end for {}", year)))?;

        Ok((start, end))
    }

    /// Top N events by mean rating, best first
    #[instrument(skip(self))]
    pub async fn top_rated(&self, limit: Option<i64>) -> ReportResult<Vec<TopRatedEvent>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_LIMIT);
        if !(1..=MAX_TOP_LIMIT).contains(&limit) {
            return Err(ReportError::Validation(format!(
                "limit must be between 1 and {}, got {}",
                MAX_TOP_LIMIT, limit
            )));
        }

        self.repository.top_rated(limit).await
    }

    /// Events ordered by review count.
    ///
    /// "asc" sorts ascending; anything else (or nothing) sorts descending.
    #[instrument(skip(self))]
    pub async fn most_rated(&self, order: Option<String>) -> ReportResult<Vec<MostRatedEvent>> {
        let order = SortOrder::parse_lenient(order.as_deref());
        self.repository.most_rated(order).await
    }

    /// Events ordered by their number of exact five-star ratings
    #[instrument(skip(self))]
    pub async fn five_star_counts(&self) -> ReportResult<Vec<FiveStarEvent>> {
        self.repository.five_star_counts().await
    }

    /// Events with reviews in the last 30 days, most reviewed first.
    ///
    /// "Now" is captured once here so the window is consistent across the
    /// whole query.
    #[instrument(skip(self))]
    pub async fn trending(&self) -> ReportResult<Vec<TrendingEvent>> {
        let since = Utc::now() - Duration::days(TRENDING_WINDOW_DAYS);
        self.repository.trending(since).await
    }

    /// Per-county rollup of events and their rating statistics.
    ///
    /// An empty match set is NotFound rather than an empty rollup.
    #[instrument(skip(self))]
    pub async fn county_rollup(&self, county: &str) -> ReportResult<CountyRollup> {
        let county = county.trim();
        if county.is_empty() {
            return Err(ReportError::Validation("missing county name".to_string()));
        }

        let events = self.repository.events_in_county(county).await?;
        if events.is_empty() {
            return Err(ReportError::CountyNotFound(county.to_string()));
        }

        let ids: Vec<Uuid> = events.iter().map(|e| e.id).collect();
        let stats = self.repository.rating_stats_for(&ids).await?;

        let county_events: Vec<CountyEvent> = events
            .into_iter()
            .map(|event| {
                let aggregate = stats.get(&event.id);
                CountyEvent {
                    average_score: aggregate.map(|a| round2(a.avg)),
                    reviews_count: aggregate.map(|a| a.count).unwrap_or(0),
                    event,
                }
            })
            .collect();

        // County average covers only events that have at least one rating
        let rated: Vec<f64> = county_events
            .iter()
            .filter_map(|e| e.average_score)
            .collect();
        let county_average = if rated.is_empty() {
            None
        } else {
            Some(round2(rated.iter().sum::<f64>() / rated.len() as f64))
        };

        Ok(CountyRollup {
            county: county.to_string(),
            total_events: county_events.len() as u64,
            county_average,
            events: county_events,
        })
    }

    /// Mean rating and review count of one event.
    ///
    /// The average of an empty review set is null, never zero.
    #[instrument(skip(self))]
    pub async fn event_stats(&self, event_id: Uuid) -> ReportResult<EventRatingStats> {
        let aggregate = self.repository.rating_stats(event_id).await?;

        Ok(match aggregate {
            Some(a) => EventRatingStats {
                average_score: Some(round2(a.avg)),
                reviews_count: a.count,
            },
            None => EventRatingStats {
                average_score: None,
                reviews_count: 0,
            },
        })
    }

    /// Users with at least one review in the given UTC calendar year
    #[instrument(skip(self))]
    pub async fn active_users(&self, year: i32) -> ReportResult<ActiveUsers> {
        let (start, end) = Self::year_bounds(year)?;
        let users = self.repository.users_active_between(start, end).await?;

        Ok(ActiveUsers {
            year,
            active_user_count: users.len() as u64,
            active_users: users,
        })
    }

    /// Events with at least one review in the given UTC calendar year
    #[instrument(skip(self))]
    pub async fn events_reviewed_in_year(&self, year: i32) -> ReportResult<ReviewedEvents> {
        let (start, end) = Self::year_bounds(year)?;
        let events = self.repository.events_reviewed_between(start, end).await?;

        Ok(ReviewedEvents { year, events })
    }

    /// The five users with the most reviews
    #[instrument(skip(self))]
    pub async fn most_active_users(&self) -> ReportResult<MostActiveUsers> {
        let top_users = self.repository.most_active_users(TOP_REVIEWERS).await?;
        let total_users = self.repository.user_count().await?;

        Ok(MostActiveUsers {
            total_users,
            top_users,
        })
    }

    /// A user's three best-rated events.
    ///
    /// Reviews sort by rating descending, ties by rated_at descending (most
    /// recent first), so the result is deterministic. Fewer than three
    /// reviews yield fewer events; none yield an empty list.
    #[instrument(skip(self))]
    pub async fn user_top_rated(&self, user_id: i64) -> ReportResult<UserTopRated> {
        let user = self
            .repository
            .get_user(user_id)
            .await?
            .ok_or(ReportError::UserNotFound(user_id))?;

        let mut reviews = user.reviews.clone();
        reviews.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.rated_at.cmp(&a.rated_at))
        });

        let ids: Vec<Uuid> = reviews
            .iter()
            .take(BEST_RATED_PER_USER)
            .map(|r| r.event_id)
            .collect();

        let mut events = self.repository.events_by_ids(&ids).await?;
        // The store returns them in arbitrary order; restore rating order
        events.sort_by_key(|e| ids.iter().position(|id| *id == e.id).unwrap_or(usize::MAX));

        Ok(UserTopRated {
            user,
            best_rated_events: events,
        })
    }
}

impl<R: ReportRepository> Clone for ReportService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RatingAggregate;
    use crate::repository::MockReportRepository;
    use domain_events::Event;
    use domain_users::{Gender, Review, User};
    use std::collections::HashMap;

    fn sample_event(county: &str) -> Event {
        Event {
            id: Uuid::now_v7(),
            change_date: Utc::now(),
            establishment_id: "EST-1".to_string(),
            establishment_name: "The Copper Kettle".to_string(),
            address: "12 High Street".to_string(),
            zip_code: "YO1 7HU".to_string(),
            county: county.to_string(),
        }
    }

    fn sample_user(id: i64, reviews: Vec<Review>) -> User {
        User {
            id,
            name: "Ada".to_string(),
            gender: Gender::F,
            age: 36,
            occupation: "engineer".to_string(),
            reviews,
        }
    }

    #[tokio::test]
    async fn test_top_rated_defaults_limit_to_ten() {
        let mut repo = MockReportRepository::new();
        repo.expect_top_rated()
            .withf(|limit| *limit == 10)
            .returning(|_| Ok(vec![]));

        let service = ReportService::new(repo);
        assert!(service.top_rated(None).await.is_ok());
    }

    #[tokio::test]
    async fn test_top_rated_rejects_out_of_range_limit() {
        let mut repo = MockReportRepository::new();
        repo.expect_top_rated().times(0);

        let service = ReportService::new(repo);
        assert!(matches!(
            service.top_rated(Some(0)).await,
            Err(ReportError::Validation(_))
        ));
        assert!(matches!(
            service.top_rated(Some(101)).await,
            Err(ReportError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_most_rated_defaults_to_descending() {
        let mut repo = MockReportRepository::new();
        repo.expect_most_rated()
            .withf(|order| *order == SortOrder::Desc)
            .returning(|_| Ok(vec![]));

        let service = ReportService::new(repo);
        assert!(
            service
                .most_rated(Some("sideways".to_string()))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_trending_window_is_thirty_days() {
        let mut repo = MockReportRepository::new();
        repo.expect_trending()
            .withf(|since| {
                let expected = Utc::now() - Duration::days(30);
                (*since - expected).num_seconds().abs() < 5
            })
            .returning(|_| Ok(vec![]));

        let service = ReportService::new(repo);
        assert!(service.trending().await.is_ok());
    }

    #[tokio::test]
    async fn test_county_rollup_empty_match_is_not_found() {
        let mut repo = MockReportRepository::new();
        repo.expect_events_in_county().returning(|_| Ok(vec![]));
        repo.expect_rating_stats_for().times(0);

        let service = ReportService::new(repo);
        let result = service.county_rollup("Atlantis").await;
        assert!(matches!(result, Err(ReportError::CountyNotFound(_))));
    }

    #[tokio::test]
    async fn test_county_rollup_trims_and_rejects_blank_county() {
        let mut repo = MockReportRepository::new();
        repo.expect_events_in_county().times(0);

        let service = ReportService::new(repo);
        let result = service.county_rollup("   ").await;
        assert!(matches!(result, Err(ReportError::Validation(_))));
    }

    #[tokio::test]
    async fn test_county_rollup_merges_stats_and_averages_rated_events_only() {
        let rated = sample_event("York");
        let unrated = sample_event("YORK");
        let rated_id = rated.id;

        let mut repo = MockReportRepository::new();
        {
            let rated = rated.clone();
            let unrated = unrated.clone();
            repo.expect_events_in_county()
                .withf(|county| county == "york")
                .returning(move |_| Ok(vec![rated.clone(), unrated.clone()]));
        }
        repo.expect_rating_stats_for().returning(move |_| {
            let mut stats = HashMap::new();
            stats.insert(
                rated_id,
                RatingAggregate {
                    avg: 4.333333,
                    count: 3,
                },
            );
            Ok(stats)
        });

        let service = ReportService::new(repo);
        let rollup = service.county_rollup("york").await.unwrap();

        assert_eq!(rollup.total_events, 2);
        // Only the rated event contributes to the county average
        assert_eq!(rollup.county_average, Some(4.33));

        let rated_entry = rollup.events.iter().find(|e| e.event.id == rated_id).unwrap();
        assert_eq!(rated_entry.average_score, Some(4.33));
        assert_eq!(rated_entry.reviews_count, 3);

        let unrated_entry = rollup.events.iter().find(|e| e.event.id != rated_id).unwrap();
        assert_eq!(unrated_entry.average_score, None);
        assert_eq!(unrated_entry.reviews_count, 0);
    }

    #[tokio::test]
    async fn test_event_stats_without_reviews_is_null_not_zero() {
        let mut repo = MockReportRepository::new();
        repo.expect_rating_stats().returning(|_| Ok(None));

        let service = ReportService::new(repo);
        let stats = service.event_stats(Uuid::now_v7()).await.unwrap();
        assert_eq!(stats.average_score, None);
        assert_eq!(stats.reviews_count, 0);
    }

    #[tokio::test]
    async fn test_event_stats_averages_reviews() {
        // Ratings [5, 3, 4] average to exactly 4.0
        let mut repo = MockReportRepository::new();
        repo.expect_rating_stats().returning(|_| {
            Ok(Some(RatingAggregate {
                avg: (5.0 + 3.0 + 4.0) / 3.0,
                count: 3,
            }))
        });

        let service = ReportService::new(repo);
        let stats = service.event_stats(Uuid::now_v7()).await.unwrap();
        assert_eq!(stats.average_score, Some(4.0));
        assert_eq!(stats.reviews_count, 3);
    }

    #[tokio::test]
    async fn test_active_users_validates_year() {
        let mut repo = MockReportRepository::new();
        repo.expect_users_active_between().times(0);

        let service = ReportService::new(repo);
        assert!(matches!(
            service.active_users(999).await,
            Err(ReportError::Validation(_))
        ));
        assert!(matches!(
            service.active_users(10000).await,
            Err(ReportError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_active_users_queries_calendar_year_bounds() {
        let mut repo = MockReportRepository::new();
        repo.expect_users_active_between()
            .withf(|start, end| {
                start.to_rfc3339().starts_with("2024-01-01T00:00:00")
                    && end.to_rfc3339().starts_with("2025-01-01T00:00:00")
            })
            .returning(|_, _| Ok(vec![sample_user(1, vec![])]));

        let service = ReportService::new(repo);
        let result = service.active_users(2024).await.unwrap();
        assert_eq!(result.year, 2024);
        assert_eq!(result.active_user_count, 1);
    }

    #[tokio::test]
    async fn test_user_top_rated_unknown_user_is_not_found() {
        let mut repo = MockReportRepository::new();
        repo.expect_get_user().returning(|_| Ok(None));
        repo.expect_events_by_ids().times(0);

        let service = ReportService::new(repo);
        let result = service.user_top_rated(42).await;
        assert!(matches!(result, Err(ReportError::UserNotFound(42))));
    }

    #[tokio::test]
    async fn test_user_top_rated_takes_top_three_by_rating() {
        // Four reviews rated [2, 5, 3, 4]; the top three are 5, 4, 3
        let events: Vec<Event> = (0..4).map(|_| sample_event("York")).collect();
        let now = Utc::now();
        let reviews: Vec<Review> = events
            .iter()
            .zip([2.0, 5.0, 3.0, 4.0])
            .map(|(event, rating)| Review {
                event_id: event.id,
                rating,
                rated_at: now,
            })
            .collect();

        let expected_order = vec![events[1].id, events[3].id, events[2].id];

        let mut repo = MockReportRepository::new();
        {
            let user = sample_user(1, reviews);
            repo.expect_get_user().returning(move |_| Ok(Some(user.clone())));
        }
        {
            let events = events.clone();
            let expected = expected_order.clone();
            repo.expect_events_by_ids()
                .withf(move |ids| ids == expected.as_slice())
                .returning(move |ids| {
                    // Return out of order to prove the service re-sorts
                    let mut found: Vec<Event> = events
                        .iter()
                        .filter(|e| ids.contains(&e.id))
                        .cloned()
                        .collect();
                    found.reverse();
                    Ok(found)
                });
        }

        let service = ReportService::new(repo);
        let result = service.user_top_rated(1).await.unwrap();

        let result_ids: Vec<Uuid> = result.best_rated_events.iter().map(|e| e.id).collect();
        assert_eq!(result_ids, expected_order);
    }

    #[tokio::test]
    async fn test_user_top_rated_breaks_rating_ties_by_recency() {
        let older = sample_event("York");
        let newer = sample_event("York");
        let now = Utc::now();

        let reviews = vec![
            Review {
                event_id: older.id,
                rating: 5.0,
                rated_at: now - Duration::days(2),
            },
            Review {
                event_id: newer.id,
                rating: 5.0,
                rated_at: now,
            },
        ];

        let newer_id = newer.id;
        let older_id = older.id;

        let mut repo = MockReportRepository::new();
        {
            let user = sample_user(1, reviews);
            repo.expect_get_user().returning(move |_| Ok(Some(user.clone())));
        }
        repo.expect_events_by_ids()
            .withf(move |ids| ids == [newer_id, older_id].as_slice())
            .returning(move |_| Ok(vec![older.clone(), newer.clone()]));

        let service = ReportService::new(repo);
        let result = service.user_top_rated(1).await.unwrap();
        assert_eq!(result.best_rated_events[0].id, newer_id);
    }

    #[tokio::test]
    async fn test_most_active_users_reports_totals() {
        let mut repo = MockReportRepository::new();
        repo.expect_most_active_users()
            .withf(|limit| *limit == 5)
            .returning(|_| Ok(vec![]));
        repo.expect_user_count().returning(|| Ok(12));

        let service = ReportService::new(repo);
        let result = service.most_active_users().await.unwrap();
        assert_eq!(result.total_users, 12);
        assert!(result.top_users.is_empty());
    }
}
