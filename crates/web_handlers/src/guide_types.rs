use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::activity_types::{Activity, validate_category, validate_difficulty};

/// Request structure for guide self-registration: the guide profile plus the
/// first activity they will offer
#[derive(Debug, Deserialize, Validate)]
pub struct GuideRegistrationRequest {
    /// Guide full name
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Guide contact email
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    /// Guide contact phone
    #[validate(length(min = 6, max = 20, message = "Phone must be between 6-20 characters"))]
    pub phone: String,

    /// Short bio shown on the guide profile
    #[validate(length(min = 1, max = 2000, message = "Bio is required"))]
    pub bio: String,

    /// Specialty slugs ("trekking", "rafting", ...)
    #[validate(length(min = 1, message = "At least one specialty is required"))]
    pub specialties: Vec<String>,

    /// The first activity created together with the guide
    #[validate(nested)]
    pub activity: NewActivityRequest,
}

/// The activity created as part of a guide registration
#[derive(Debug, Deserialize, Validate)]
pub struct NewActivityRequest {
    /// Display title
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    /// Full description
    #[validate(length(min = 1, max = 5000, message = "Description is required"))]
    pub description: String,

    /// Price per participant
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    /// Duration as displayed ("6 hours", "full day")
    #[validate(length(min = 1, max = 100, message = "Duration is required"))]
    pub duration: String,

    /// Meeting point / area
    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,

    /// Category slug
    #[validate(custom(function = "validate_category"))]
    pub category: String,

    /// Difficulty slug
    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: String,

    /// What the price includes
    #[serde(default)]
    pub included: Vec<String>,

    /// What travelers must bring or pay separately
    #[serde(default)]
    pub not_included: Vec<String>,

    /// Gallery image URLs
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// A guide row as stored in the database
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Guide {
    /// Unique identifier for the guide
    pub id: Uuid,
    /// Guide full name
    pub name: String,
    /// Guide contact email
    pub email: String,
    /// Guide contact phone
    pub phone: String,
    /// Short bio shown on the guide profile
    pub bio: String,
    /// Specialty slugs
    pub specialties: Vec<String>,
    /// Whether an admin has verified this guide
    pub verified: bool,
    /// Average review rating (one decimal)
    pub rating: f64,
    /// Number of reviews behind the average
    pub total_reviews: i32,
    /// When the guide registered
    pub created_at: DateTime<Utc>,
    /// When the guide was last updated
    pub updated_at: DateTime<Utc>,
}

/// Response structure for a completed registration
#[derive(Debug, Serialize)]
pub struct GuideRegistrationResponse {
    /// The created guide (unverified)
    pub guide: Guide,
    /// The created activity
    pub activity: Activity,
}

/// Admin filter for the guide listing
#[derive(Debug, Deserialize)]
pub struct GuideQuery {
    /// Restrict to verified or unverified guides
    pub verified: Option<bool>,
}

/// Response structure for the admin guide listing
#[derive(Debug, Serialize)]
pub struct ListGuidesResponse {
    /// Guides matching the filter, newest first
    pub guides: Vec<Guide>,
    /// Total count returned
    pub total: i64,
}

/// Custom error type for guide operations
#[derive(thiserror::Error, Debug)]
pub enum GuideError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Guide not found
    #[error("Guide not found")]
    NotFound,

    /// A guide with this email is already registered
    #[error("Guide email already registered")]
    EmailExists,

    /// The guide row was created but the dependent activity insert failed
    #[error("Guide {guide_id} was created but the activity step failed: {source}")]
    PartialRegistration {
        /// The guide that was created before the failure
        guide_id: Uuid,
        /// The activity insert failure
        #[source]
        source: sqlx::Error,
    },
}

impl actix_web::ResponseError for GuideError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            GuideError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            GuideError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "guide_not_found",
                "message": "Guide not found"
            })),
            GuideError::EmailExists => HttpResponse::Conflict().json(serde_json::json!({
                "error": "email_exists",
                "message": "A guide with this email is already registered"
            })),
            GuideError::PartialRegistration { guide_id, .. } => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "partial_registration",
                    "message": format!(
                        "Guide {} was created but the activity step failed",
                        guide_id
                    ),
                    "failed_step": "activity",
                    "guide_id": guide_id
                }))
            }
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}
