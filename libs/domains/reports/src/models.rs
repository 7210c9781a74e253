use domain_events::Event;
use domain_users::User;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Sort direction for the ratings-count ordering query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse a direction leniently: "asc" (any case) sorts ascending,
    /// anything else - including nothing - sorts descending.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    /// MongoDB sort direction value
    pub fn as_mongo(&self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// Round to two decimal places, the precision every reported average uses
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Query parameters of the top-rated events report
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct TopQuery {
    /// Number of events to return (default 10, max 100)
    pub limit: Option<i64>,
}

/// Query parameters of the most-rated events report
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct OrderQuery {
    /// Sort direction: "asc" or "desc" (default "desc")
    pub order: Option<String>,
}

/// An event augmented with its mean rating and review count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopRatedEvent {
    #[serde(flatten)]
    pub event: Event,
    /// Mean rating, rounded to 2 decimal places
    pub average_score: f64,
    pub reviews_count: u64,
}

/// An event augmented with its review count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MostRatedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub reviews_count: u64,
}

/// An event augmented with its number of exact 5.0 ratings
///
/// Counts exact five-star ratings only; a 4.9 average contributes nothing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FiveStarEvent {
    #[serde(flatten)]
    pub event: Event,
    pub five_stars_count: u64,
}

/// An event augmented with its review count inside the trending window
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TrendingEvent {
    #[serde(flatten)]
    pub event: Event,
    pub recent_review_count: u64,
}

/// Per-event rating statistics
///
/// `average_score` is null - not zero - when the event has no reviews.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventRatingStats {
    pub average_score: Option<f64>,
    pub reviews_count: u64,
}

/// Raw mean/count aggregate for one event, before rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingAggregate {
    pub avg: f64,
    pub count: u64,
}

/// An event inside a county rollup, with its rating stats merged on
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CountyEvent {
    #[serde(flatten)]
    pub event: Event,
    /// Mean rating rounded to 2 decimals; null when the event has no reviews
    pub average_score: Option<f64>,
    pub reviews_count: u64,
}

/// Per-county summary statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CountyRollup {
    pub county: String,
    pub total_events: u64,
    /// Mean of `average_score` across rated events only; null when none are rated
    pub county_average: Option<f64>,
    pub events: Vec<CountyEvent>,
}

/// Users active (at least one review) in a given calendar year, UTC
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActiveUsers {
    pub year: i32,
    pub active_user_count: u64,
    pub active_users: Vec<User>,
}

/// Events reviewed at least once in a given calendar year, UTC
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReviewedEvents {
    pub year: i32,
    pub events: Vec<Event>,
}

/// A user augmented with the number of reviews they have submitted
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopReviewer {
    #[serde(flatten)]
    pub user: User,
    pub review_count: u64,
}

/// The most active users by review count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MostActiveUsers {
    pub total_users: u64,
    pub top_users: Vec<TopReviewer>,
}

/// A user together with the events behind their highest-rated reviews
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserTopRated {
    pub user: User,
    pub best_rated_events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_parse_lenient() {
        assert_eq!(SortOrder::parse_lenient(Some("asc")), SortOrder::Asc);
        assert_eq!(SortOrder::parse_lenient(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse_lenient(Some("desc")), SortOrder::Desc);
        // Anything unrecognized falls back to descending
        assert_eq!(SortOrder::parse_lenient(Some("sideways")), SortOrder::Desc);
        assert_eq!(SortOrder::parse_lenient(None), SortOrder::Desc);
    }

    #[test]
    fn test_sort_order_mongo_direction() {
        assert_eq!(SortOrder::Asc.as_mongo(), 1);
        assert_eq!(SortOrder::Desc.as_mongo(), -1);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(4.666666), 4.67);
        assert_eq!(round2(4.0), 4.0);
        assert_eq!(round2(3.125), 3.13);
    }

    #[test]
    fn test_top_rated_event_flattens_event_fields() {
        use chrono::Utc;
        use uuid::Uuid;

        let entry = TopRatedEvent {
            event: Event {
                id: Uuid::now_v7(),
                change_date: Utc::now(),
                establishment_id: "EST-1".to_string(),
                establishment_name: "The Copper Kettle".to_string(),
                address: "12 High Street".to_string(),
                zip_code: "YO1 7HU".to_string(),
                county: "York".to_string(),
            },
            average_score: 4.5,
            reviews_count: 12,
        };

        let json = serde_json::to_value(&entry).unwrap();
        // Event fields sit at the top level next to the stats
        assert_eq!(json["county"], "York");
        assert_eq!(json["average_score"], 4.5);
        assert_eq!(json["reviews_count"], 12);
    }
}
