use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::EventResult;
use crate::models::{CreateEvent, Event, EventPage, Pagination, UpdateEvent};
use crate::repository::EventRepository;
use crate::service::EventService;

/// OpenAPI documentation for the Events API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_events,
        create_event,
        create_events_batch,
        get_event,
        update_event,
        delete_event,
    ),
    components(
        schemas(Event, CreateEvent, UpdateEvent, EventPage),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Events", description = "Inspection event management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the events router with all HTTP endpoints
pub fn router<R: EventRepository + 'static>(service: EventService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/batch", post(create_events_batch))
        .route(
            "/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .with_state(shared_service)
}

/// List events with page-based pagination
#[utoipa::path(
    get,
    path = "",
    tag = "Events",
    params(Pagination),
    responses(
        (status = 200, description = "One page of events", body = EventPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_events<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Query(pagination): Query<Pagination>,
) -> EventResult<Json<EventPage>> {
    let page = service.list_events(pagination).await?;
    Ok(Json(page))
}

/// Create a new event
#[utoipa::path(
    post,
    path = "",
    tag = "Events",
    request_body = CreateEvent,
    responses(
        (status = 201, description = "Event created successfully", body = Event),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateEvent>,
) -> EventResult<impl IntoResponse> {
    let event = service.create_event(input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Create multiple events in one batch
#[utoipa::path(
    post,
    path = "/batch",
    tag = "Events",
    request_body = Vec<CreateEvent>,
    responses(
        (status = 201, description = "Events created successfully", body = Vec<Event>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_events_batch<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Json(inputs): Json<Vec<CreateEvent>>,
) -> EventResult<impl IntoResponse> {
    let events = service.create_events(inputs).await?;
    Ok((StatusCode::CREATED, Json(events)))
}

/// Get an event by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Events",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPath(id): UuidPath,
) -> EventResult<Json<Event>> {
    let event = service.get_event(id).await?;
    Ok(Json(event))
}

/// Update an event
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Events",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEvent,
    responses(
        (status = 200, description = "Event updated successfully", body = Event),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateEvent>,
) -> EventResult<Json<Event>> {
    let event = service.update_event(id, input).await?;
    Ok(Json(event))
}

/// Delete an event
///
/// Also removes every review referencing the event from all users.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Events",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deleted successfully"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    UuidPath(id): UuidPath,
) -> EventResult<impl IntoResponse> {
    service.delete_event(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventError;
    use crate::repository::MockEventRepository;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::Utc;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn sample_event() -> Event {
        Event {
            id: Uuid::now_v7(),
            change_date: Utc::now(),
            establishment_id: "EST-001".to_string(),
            establishment_name: "The Copper Kettle".to_string(),
            address: "12 High Street".to_string(),
            zip_code: "YO1 7HU".to_string(),
            county: "York".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_event_returns_201() {
        let mut repo = MockEventRepository::new();
        repo.expect_create()
            .returning(|input| Ok(Event::new(input)));

        let app = router(EventService::new(repo));

        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_string(&serde_json::json!({
                    "change_date": Utc::now(),
                    "establishment_id": "EST-001",
                    "establishment_name": "The Copper Kettle",
                    "address": "12 High Street",
                    "zip_code": "YO1 7HU",
                    "county": "York"
                }))
                .unwrap(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let event: Event = json_body(response.into_body()).await;
        assert_eq!(event.county, "York");
    }

    #[tokio::test]
    async fn test_create_event_validates_input() {
        let mut repo = MockEventRepository::new();
        repo.expect_create().times(0);

        let app = router(EventService::new(repo));

        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_string(&serde_json::json!({
                    "change_date": Utc::now(),
                    "establishment_id": "EST-001",
                    "establishment_name": "",
                    "address": "12 High Street",
                    "zip_code": "YO1 7HU",
                    "county": "York"
                }))
                .unwrap(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_event_returns_404_when_missing() {
        let mut repo = MockEventRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let app = router(EventService::new(repo));

        let request = Request::builder()
            .uri(format!("/{}", Uuid::now_v7()))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_event_rejects_malformed_id() {
        let repo = MockEventRepository::new();
        let app = router(EventService::new(repo));

        let request = Request::builder()
            .uri("/not-a-uuid")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_event_returns_204() {
        let mut repo = MockEventRepository::new();
        repo.expect_delete().returning(|_| Ok(true));

        let app = router(EventService::new(repo));

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/{}", Uuid::now_v7()))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_delete_event_returns_404_when_missing() {
        let mut repo = MockEventRepository::new();
        repo.expect_delete()
            .returning(|id| Err(EventError::NotFound(id)));

        let app = router(EventService::new(repo));

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/{}", Uuid::now_v7()))
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_events_returns_page_envelope() {
        let mut repo = MockEventRepository::new();
        repo.expect_list().returning(|_| Ok(vec![sample_event()]));
        repo.expect_count().returning(|| Ok(1));

        let app = router(EventService::new(repo));

        let request = Request::builder()
            .uri("/?page=1&limit=20")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let page: EventPage = json_body(response.into_body()).await;
        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
    }
}
