use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request structure for submitting a review
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    /// Guide being reviewed
    pub guide_id: Uuid,

    /// Activity the review refers to, when the traveler reviewed a
    /// specific outing rather than the guide in general
    pub activity_id: Option<Uuid>,

    /// Registered reviewer profile, when logged in
    pub user_id: Option<Uuid>,

    /// Display name shown next to the review
    #[validate(length(min = 1, max = 255, message = "Reviewer name is required"))]
    pub author_name: String,

    /// Star rating
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    /// Review text
    #[validate(length(min = 1, max = 2000, message = "Comment is required"))]
    pub comment: String,
}

/// A review row, with the author name resolved against user profiles
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Review {
    /// Unique identifier for the review
    pub id: Uuid,
    /// Guide being reviewed
    pub guide_id: Uuid,
    /// Activity the review refers to, when any
    pub activity_id: Option<Uuid>,
    /// Registered reviewer profile, when any
    pub user_id: Option<Uuid>,
    /// Display name shown next to the review
    pub author_name: String,
    /// Star rating (1-5)
    pub rating: i32,
    /// Review text
    pub comment: String,
    /// When the review was submitted
    pub created_at: DateTime<Utc>,
}

/// Recomputed aggregate after a review lands
#[derive(Debug, Serialize)]
pub struct RatingSummary {
    /// Arithmetic mean of all ratings, rounded to one decimal
    pub average: f64,
    /// Number of ratings behind the average
    pub count: i64,
}

/// Response structure for a submitted review
#[derive(Debug, Serialize)]
pub struct CreateReviewResponse {
    /// The stored review
    pub review: Review,
    /// The guide's recomputed aggregate
    pub guide: RatingSummary,
    /// The activity's recomputed aggregate, when the review named one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<RatingSummary>,
}

/// Response structure for review listings
#[derive(Debug, Serialize)]
pub struct ListReviewsResponse {
    /// Reviews, newest first
    pub reviews: Vec<Review>,
    /// Total count returned
    pub total: i64,
}

/// Custom error type for review operations
#[derive(thiserror::Error, Debug)]
pub enum ReviewError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The reviewed guide does not exist
    #[error("Guide not found")]
    GuideNotFound,

    /// The reviewed activity does not exist
    #[error("Activity not found")]
    ActivityNotFound,
}

impl actix_web::ResponseError for ReviewError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            ReviewError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            ReviewError::GuideNotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "guide_not_found",
                "message": "Guide not found"
            })),
            ReviewError::ActivityNotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "activity_not_found",
                "message": "Activity not found"
            })),
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}
