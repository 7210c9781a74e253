use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// User gender
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum Gender {
    M,
    F,
}

/// One user's rating of one event, embedded in the user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    /// Referenced event id
    pub event_id: Uuid,
    /// Rating in [0, 5]
    pub rating: f64,
    /// When the rating was given
    pub rated_at: DateTime<Utc>,
}

/// User entity - stored in the `users` collection
///
/// User ids are small integers allocated from an atomic counter, unlike
/// event ids which are store-opaque UUIDs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Gender, M or F
    pub gender: Gender,
    /// Age in years, 0..=150
    pub age: i32,
    /// Occupation
    pub occupation: String,
    /// Reviews this user has submitted, in insertion order
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// DTO for a review supplied inside a create/update user payload
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ReviewInput {
    /// Referenced event id
    pub event_id: Uuid,
    /// Rating in [0, 5]
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    /// When the rating was given (defaults to now)
    pub rated_at: Option<DateTime<Utc>>,
}

impl From<ReviewInput> for Review {
    fn from(input: ReviewInput) -> Self {
        Self {
            event_id: input.event_id,
            rating: input.rating,
            rated_at: input.rated_at.unwrap_or_else(Utc::now),
        }
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub gender: Gender,
    #[validate(range(min = 0, max = 150))]
    pub age: i32,
    #[validate(length(min = 1, max = 255))]
    pub occupation: String,
    /// Initial reviews; every referenced event must exist
    #[serde(default)]
    #[validate(nested)]
    pub reviews: Vec<ReviewInput>,
}

/// DTO for partially updating an existing user
///
/// When `reviews` is supplied it replaces the whole review list.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub gender: Option<Gender>,
    #[validate(range(min = 0, max = 150))]
    pub age: Option<i32>,
    #[validate(length(min = 1, max = 255))]
    pub occupation: Option<String>,
    #[validate(nested)]
    pub reviews: Option<Vec<ReviewInput>>,
}

/// Body of the review upsert endpoint
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct RateEvent {
    /// Rating in [0, 5]
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    /// When the rating was given (defaults to now)
    pub rated_at: Option<DateTime<Utc>>,
}

/// Page-based pagination parameters
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct Pagination {
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u64,
    /// Page size, capped at 100
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    /// Clamp page to >= 1 and limit to 1..=100
    pub fn normalized(&self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, 100),
        }
    }

    /// Number of documents to skip for this page
    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit as u64
    }
}

/// Paged user listing envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPage {
    pub page: u64,
    pub limit: i64,
    pub total: u64,
    pub items: Vec<User>,
}

impl User {
    /// Build a user from the CreateUser DTO and an allocated id
    pub fn new(id: i64, input: CreateUser) -> Self {
        Self {
            id,
            name: input.name,
            gender: input.gender,
            age: input.age,
            occupation: input.occupation,
            reviews: input.reviews.into_iter().map(Review::from).collect(),
        }
    }

    /// Apply updates from the UpdateUser DTO
    pub fn apply_update(&mut self, update: UpdateUser) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(occupation) = update.occupation {
            self.occupation = occupation;
        }
        if let Some(reviews) = update.reviews {
            self.reviews = reviews.into_iter().map(Review::from).collect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn create_input() -> CreateUser {
        CreateUser {
            name: "Ada".to_string(),
            gender: Gender::F,
            age: 36,
            occupation: "engineer".to_string(),
            reviews: vec![],
        }
    }

    #[test]
    fn test_user_new_keeps_assigned_id() {
        let user = User::new(7, create_input());
        assert_eq!(user.id, 7);
        assert!(user.reviews.is_empty());
    }

    #[test]
    fn test_gender_serializes_as_single_letter() {
        assert_eq!(serde_json::to_string(&Gender::M).unwrap(), "\"M\"");
        assert_eq!(serde_json::to_string(&Gender::F).unwrap(), "\"F\"");
        assert!(serde_json::from_str::<Gender>("\"X\"").is_err());
    }

    #[test]
    fn test_create_user_rejects_out_of_range_age() {
        let mut input = create_input();
        input.age = 151;
        assert!(input.validate().is_err());

        input.age = -1;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_user_validates_nested_reviews() {
        let mut input = create_input();
        input.reviews.push(ReviewInput {
            event_id: Uuid::now_v7(),
            rating: 5.5,
            rated_at: None,
        });
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_review_input_defaults_rated_at_to_now() {
        let before = Utc::now();
        let review: Review = ReviewInput {
            event_id: Uuid::now_v7(),
            rating: 4.0,
            rated_at: None,
        }
        .into();
        assert!(review.rated_at >= before);
    }

    #[test]
    fn test_apply_update_replaces_review_list() {
        let mut user = User::new(1, create_input());
        user.reviews.push(Review {
            event_id: Uuid::now_v7(),
            rating: 2.0,
            rated_at: Utc::now(),
        });

        let replacement = Uuid::now_v7();
        user.apply_update(UpdateUser {
            reviews: Some(vec![ReviewInput {
                event_id: replacement,
                rating: 5.0,
                rated_at: None,
            }]),
            ..Default::default()
        });

        assert_eq!(user.reviews.len(), 1);
        assert_eq!(user.reviews[0].event_id, replacement);
    }

    #[test]
    fn test_user_id_serializes_under_underscore_id() {
        let user = User::new(42, create_input());
        let doc = mongodb::bson::to_document(&user).unwrap();
        assert_eq!(doc.get_i64("_id").unwrap(), 42);
    }
}
