use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::UserResult;
use crate::models::{
    CreateUser, Gender, Pagination, RateEvent, Review, ReviewInput, UpdateUser, User, UserPage,
};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        create_user,
        get_user,
        update_user,
        delete_user,
        rate_event,
    ),
    components(
        schemas(
            User,
            Gender,
            Review,
            ReviewInput,
            CreateUser,
            UpdateUser,
            RateEvent,
            UserPage
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "User and review management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/reviews/{event_id}", put(rate_event))
        .with_state(shared_service)
}

/// List users with page-based pagination
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    params(Pagination),
    responses(
        (status = 200, description = "One page of users", body = UserPage),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Query(pagination): Query<Pagination>,
) -> UserResult<Json<UserPage>> {
    let page = service.list_users(pagination).await?;
    Ok(Json(page))
}

/// Create a new user
///
/// Every event referenced by an embedded review must already exist.
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<i64>,
) -> UserResult<Json<User>> {
    let user = service.get_user(id).await?;
    Ok(Json(user))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated successfully", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<i64>,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<User>> {
    let user = service.update_user(id, input).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<i64>,
) -> UserResult<impl IntoResponse> {
    service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add or update this user's review of an event
///
/// Updates the existing review for the event in place when present, appends
/// a new one otherwise.
#[utoipa::path(
    put,
    path = "/{id}/reviews/{event_id}",
    tag = "Users",
    params(
        ("id" = i64, Path, description = "User ID"),
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = RateEvent,
    responses(
        (status = 201, description = "Review stored"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn rate_event<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path((id, event_id)): Path<(i64, Uuid)>,
    ValidatedJson(input): ValidatedJson<RateEvent>,
) -> UserResult<impl IntoResponse> {
    service.rate_event(id, event_id, input).await?;
    Ok(StatusCode::CREATED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UserError;
    use crate::repository::MockUserRepository;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_returns_201() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .returning(|input| Ok(User::new(1, input)));

        let app = router(UserService::new(repo));

        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_string(&serde_json::json!({
                    "name": "Ada",
                    "gender": "F",
                    "age": 36,
                    "occupation": "engineer"
                }))
                .unwrap(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let user: User = json_body(response.into_body()).await;
        assert_eq!(user.id, 1);
        assert_eq!(user.gender, Gender::F);
    }

    #[tokio::test]
    async fn test_create_user_rejects_invalid_gender() {
        let repo = MockUserRepository::new();
        let app = router(UserService::new(repo));

        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_string(&serde_json::json!({
                    "name": "Ada",
                    "gender": "X",
                    "age": 36,
                    "occupation": "engineer"
                }))
                .unwrap(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        // Unknown enum variant fails JSON deserialization
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_get_user_returns_404_when_missing() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));

        let app = router(UserService::new(repo));

        let request = Request::builder()
            .uri("/99")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rate_event_returns_201() {
        let mut repo = MockUserRepository::new();
        repo.expect_missing_events().returning(|_| Ok(vec![]));
        repo.expect_upsert_review().returning(|_, _, _, _| Ok(()));

        let app = router(UserService::new(repo));

        let request = Request::builder()
            .method("PUT")
            .uri(format!("/1/reviews/{}", Uuid::now_v7()))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_string(&serde_json::json!({ "rating": 4.5 })).unwrap(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_rate_event_returns_404_for_unknown_event() {
        let mut repo = MockUserRepository::new();
        repo.expect_missing_events()
            .returning(|ids| Ok(ids.to_vec()));
        repo.expect_upsert_review().times(0);

        let app = router(UserService::new(repo));

        let request = Request::builder()
            .method("PUT")
            .uri(format!("/1/reviews/{}", Uuid::now_v7()))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_string(&serde_json::json!({ "rating": 4.5 })).unwrap(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_rate_event_rejects_out_of_range_rating() {
        let repo = MockUserRepository::new();
        let app = router(UserService::new(repo));

        let request = Request::builder()
            .method("PUT")
            .uri(format!("/1/reviews/{}", Uuid::now_v7()))
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::to_string(&serde_json::json!({ "rating": 6.0 })).unwrap(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_user_returns_404_when_missing() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete()
            .returning(|id| Err(UserError::NotFound(id)));

        let app = router(UserService::new(repo));

        let request = Request::builder()
            .method("DELETE")
            .uri("/42")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
