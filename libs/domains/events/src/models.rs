use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Inspection event entity - one inspection of an establishment, stored in
/// the `events` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// When the inspection record was last changed
    pub change_date: DateTime<Utc>,
    /// External establishment identifier
    pub establishment_id: String,
    /// Establishment name
    pub establishment_name: String,
    /// Street address
    pub address: String,
    /// ZIP code
    pub zip_code: String,
    /// County the establishment belongs to
    pub county: String,
}

/// DTO for creating a new event
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateEvent {
    pub change_date: DateTime<Utc>,
    #[validate(length(min = 1, max = 64))]
    pub establishment_id: String,
    #[validate(length(min = 1, max = 255))]
    pub establishment_name: String,
    #[validate(length(min = 1, max = 255))]
    pub address: String,
    #[validate(length(min = 1, max = 16))]
    pub zip_code: String,
    #[validate(length(min = 1, max = 64))]
    pub county: String,
}

/// DTO for partially updating an existing event
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateEvent {
    pub change_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 64))]
    pub establishment_id: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub establishment_name: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 16))]
    pub zip_code: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub county: Option<String>,
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

/// Paged event listing envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventPage {
    pub page: u64,
    pub limit: i64,
    pub total: u64,
    pub items: Vec<Event>,
}

impl Event {
    /// Create a new event from the CreateEvent DTO with a fresh id
    pub fn new(input: CreateEvent) -> Self {
        Self {
            id: Uuid::now_v7(),
            change_date: input.change_date,
            establishment_id: input.establishment_id,
            establishment_name: input.establishment_name,
            address: input.address,
            zip_code: input.zip_code,
            county: input.county,
        }
    }

    /// Apply updates from the UpdateEvent DTO
    pub fn apply_update(&mut self, update: UpdateEvent) {
        if let Some(change_date) = update.change_date {
            self.change_date = change_date;
        }
        if let Some(establishment_id) = update.establishment_id {
            self.establishment_id = establishment_id;
        }
        if let Some(establishment_name) = update.establishment_name {
            self.establishment_name = establishment_name;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(zip_code) = update.zip_code {
            self.zip_code = zip_code;
        }
        if let Some(county) = update.county {
            self.county = county;
        }
    }
}
