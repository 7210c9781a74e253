use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use axum_helpers::errors::responses::{
    BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
    NotFoundResponse,
};
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::ReportResult;
use crate::models::{
    ActiveUsers, CountyEvent, CountyRollup, EventRatingStats, FiveStarEvent, MostActiveUsers,
    MostRatedEvent, OrderQuery, ReviewedEvents, TopQuery, TopRatedEvent, TopReviewer,
    TrendingEvent, UserTopRated,
};
use crate::repository::ReportRepository;
use crate::service::ReportService;

/// OpenAPI documentation for the Reports API
#[derive(OpenApi)]
#[openapi(
    paths(
        top_rated_events,
        most_rated_events,
        five_star_events,
        trending_events,
        events_reviewed_in_year,
        event_stats,
        county_rollup,
        active_users,
        most_active_users,
        user_top_rated,
    ),
    components(
        schemas(
            TopRatedEvent,
            MostRatedEvent,
            FiveStarEvent,
            TrendingEvent,
            ReviewedEvents,
            EventRatingStats,
            CountyEvent,
            CountyRollup,
            ActiveUsers,
            TopReviewer,
            MostActiveUsers,
            UserTopRated
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Reports", description = "Rating and activity statistics over events and user reviews")
    )
)]
pub struct ApiDoc;

/// Create the reports router with all HTTP endpoints
pub fn router<R: ReportRepository + 'static>(service: ReportService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/events/top", get(top_rated_events))
        .route("/events/most-rated", get(most_rated_events))
        .route("/events/five-stars", get(five_star_events))
        .route("/events/trending", get(trending_events))
        .route("/events/reviewed/{year}", get(events_reviewed_in_year))
        .route("/events/{id}/stats", get(event_stats))
        .route("/counties/{county}", get(county_rollup))
        .route("/users/active/{year}", get(active_users))
        .route("/users/top", get(most_active_users))
        .route("/users/{id}/top-rated", get(user_top_rated))
        .with_state(shared_service)
}

/// Top events by mean rating
///
/// Events with no reviews never appear. Equal means order deterministically
/// by review count, then id.
#[utoipa::path(
    get,
    path = "/events/top",
    tag = "Reports",
    params(TopQuery),
    responses(
        (status = 200, description = "Top-rated events, best first", body = Vec<TopRatedEvent>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn top_rated_events<R: ReportRepository>(
    State(service): State<Arc<ReportService<R>>>,
    Query(query): Query<TopQuery>,
) -> ReportResult<Json<Vec<TopRatedEvent>>> {
    let events = service.top_rated(query.limit).await?;
    Ok(Json(events))
}

/// Events ordered by review count
#[utoipa::path(
    get,
    path = "/events/most-rated",
    tag = "Reports",
    params(OrderQuery),
    responses(
        (status = 200, description = "Events ordered by review count", body = Vec<MostRatedEvent>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn most_rated_events<R: ReportRepository>(
    State(service): State<Arc<ReportService<R>>>,
    Query(query): Query<OrderQuery>,
) -> ReportResult<Json<Vec<MostRatedEvent>>> {
    let events = service.most_rated(query.order).await?;
    Ok(Json(events))
}

/// Events ordered by number of exact five-star ratings
#[utoipa::path(
    get,
    path = "/events/five-stars",
    tag = "Reports",
    responses(
        (status = 200, description = "Events with five-star counts, descending", body = Vec<FiveStarEvent>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn five_star_events<R: ReportRepository>(
    State(service): State<Arc<ReportService<R>>>,
) -> ReportResult<Json<Vec<FiveStarEvent>>> {
    let events = service.five_star_counts().await?;
    Ok(Json(events))
}

/// Events reviewed in the last 30 days
#[utoipa::path(
    get,
    path = "/events/trending",
    tag = "Reports",
    responses(
        (status = 200, description = "Events with recent review counts, descending", body = Vec<TrendingEvent>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn trending_events<R: ReportRepository>(
    State(service): State<Arc<ReportService<R>>>,
) -> ReportResult<Json<Vec<TrendingEvent>>> {
    let events = service.trending().await?;
    Ok(Json(events))
}

/// Events reviewed at least once in a calendar year (UTC)
#[utoipa::path(
    get,
    path = "/events/reviewed/{year}",
    tag = "Reports",
    params(
        ("year" = i32, Path, description = "4-digit year")
    ),
    responses(
        (status = 200, description = "Events reviewed in that year", body = ReviewedEvents),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn events_reviewed_in_year<R: ReportRepository>(
    State(service): State<Arc<ReportService<R>>>,
    Path(year): Path<i32>,
) -> ReportResult<Json<ReviewedEvents>> {
    let events = service.events_reviewed_in_year(year).await?;
    Ok(Json(events))
}

/// Rating statistics of one event
///
/// `average_score` is null when the event has no reviews.
#[utoipa::path(
    get,
    path = "/events/{id}/stats",
    tag = "Reports",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Mean rating and review count", body = EventRatingStats),
        (status = 400, response = BadRequestUuidResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn event_stats<R: ReportRepository>(
    State(service): State<Arc<ReportService<R>>>,
    Path(id): Path<Uuid>,
) -> ReportResult<Json<EventRatingStats>> {
    let stats = service.event_stats(id).await?;
    Ok(Json(stats))
}

/// Per-county rollup of events and rating statistics
///
/// The county matches case-insensitively after trimming. A county with no
/// events is a 404, not an empty rollup.
#[utoipa::path(
    get,
    path = "/counties/{county}",
    tag = "Reports",
    params(
        ("county" = String, Path, description = "County name, case-insensitive")
    ),
    responses(
        (status = 200, description = "County rollup", body = CountyRollup),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn county_rollup<R: ReportRepository>(
    State(service): State<Arc<ReportService<R>>>,
    Path(county): Path<String>,
) -> ReportResult<Json<CountyRollup>> {
    let rollup = service.county_rollup(&county).await?;
    Ok(Json(rollup))
}

/// Users active in a calendar year (UTC)
#[utoipa::path(
    get,
    path = "/users/active/{year}",
    tag = "Reports",
    params(
        ("year" = i32, Path, description = "4-digit year")
    ),
    responses(
        (status = 200, description = "Users with at least one review that year", body = ActiveUsers),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn active_users<R: ReportRepository>(
    State(service): State<Arc<ReportService<R>>>,
    Path(year): Path<i32>,
) -> ReportResult<Json<ActiveUsers>> {
    let users = service.active_users(year).await?;
    Ok(Json(users))
}

/// The five users with the most reviews
#[utoipa::path(
    get,
    path = "/users/top",
    tag = "Reports",
    responses(
        (status = 200, description = "Most active users", body = MostActiveUsers),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn most_active_users<R: ReportRepository>(
    State(service): State<Arc<ReportService<R>>>,
) -> ReportResult<Json<MostActiveUsers>> {
    let users = service.most_active_users().await?;
    Ok(Json(users))
}

/// A user's three best-rated events
#[utoipa::path(
    get,
    path = "/users/{id}/top-rated",
    tag = "Reports",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User with their best-rated events", body = UserTopRated),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn user_top_rated<R: ReportRepository>(
    State(service): State<Arc<ReportService<R>>>,
    Path(id): Path<i64>,
) -> ReportResult<Json<UserTopRated>> {
    let result = service.user_top_rated(id).await?;
    Ok(Json(result))
}
