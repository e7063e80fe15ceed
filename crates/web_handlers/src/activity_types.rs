use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// An activity row as stored in the database.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Activity {
    /// Unique identifier for the activity
    pub id: Uuid,
    /// Guide offering this activity
    pub guide_id: Uuid,
    /// Display title
    pub title: String,
    /// Full description
    pub description: String,
    /// Price per participant
    pub price: f64,
    /// Duration as displayed ("6 hours", "full day")
    pub duration: String,
    /// Meeting point / area
    pub location: String,
    /// Category slug (trekking, rafting, ...)
    pub category: String,
    /// Difficulty slug (easy, moderate, hard, expert)
    pub difficulty: String,
    /// What the price includes
    pub included: Vec<String>,
    /// What travelers must bring or pay separately
    pub not_included: Vec<String>,
    /// Gallery image URLs
    pub image_urls: Vec<String>,
    /// Average review rating (one decimal)
    pub rating: f64,
    /// Number of reviews behind the average
    pub total_reviews: i32,
    /// When the activity was created
    pub created_at: DateTime<Utc>,
    /// When the activity was last updated
    pub updated_at: DateTime<Utc>,
}

/// Browse filters accepted by the activity listing.
#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    /// Restrict to one category slug
    pub category: Option<String>,
    /// Restrict to one difficulty slug
    pub difficulty: Option<String>,
    /// Substring match on the location
    pub location: Option<String>,
}

/// Response structure for the activity listing.
#[derive(Debug, Serialize)]
pub struct ListActivitiesResponse {
    /// Activities matching the filters, best-rated first
    pub activities: Vec<Activity>,
    /// Total count returned
    pub total: i64,
}

/// Admin edit of an activity; absent fields keep their current value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateActivityRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must not be empty"))]
    pub title: Option<String>,

    /// New description
    #[validate(length(min = 1, max = 5000, message = "Description must not be empty"))]
    pub description: Option<String>,

    /// New price per participant
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,

    /// New duration label
    #[validate(length(min = 1, max = 100, message = "Duration must not be empty"))]
    pub duration: Option<String>,

    /// New meeting point / area
    #[validate(length(min = 1, max = 255, message = "Location must not be empty"))]
    pub location: Option<String>,

    /// New category slug
    #[validate(custom(function = "validate_category"))]
    pub category: Option<String>,

    /// New difficulty slug
    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: Option<String>,

    /// Replacement included list
    pub included: Option<Vec<String>>,

    /// Replacement not-included list
    pub not_included: Option<Vec<String>>,

    /// Replacement gallery
    pub image_urls: Option<Vec<String>>,
}

/// Custom error type for activity operations
#[derive(thiserror::Error, Debug)]
pub enum ActivityError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Activity not found
    #[error("Activity not found")]
    NotFound,
}

impl actix_web::ResponseError for ActivityError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            ActivityError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            ActivityError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
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

/// Custom validation function for activity categories
pub fn validate_category(category: &str) -> Result<(), validator::ValidationError> {
    match category {
        "trekking" | "rafting" | "kayaking" | "climbing" | "skiing" | "horseback_riding"
        | "fishing" | "paragliding" | "mountain_biking" | "boat_tour" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_category")),
    }
}

/// Custom validation function for difficulty levels
pub fn validate_difficulty(difficulty: &str) -> Result<(), validator::ValidationError> {
    match difficulty {
        "easy" | "moderate" | "hard" | "expert" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_difficulty")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_and_difficulties_pass() {
        assert!(validate_category("trekking").is_ok());
        assert!(validate_category("boat_tour").is_ok());
        assert!(validate_difficulty("moderate").is_ok());
    }

    #[test]
    fn unknown_slugs_are_rejected() {
        assert!(validate_category("base_jumping").is_err());
        assert!(validate_difficulty("extreme").is_err());
    }

    #[test]
    fn update_request_validates_present_fields_only() {
        let empty = UpdateActivityRequest {
            title: None,
            description: None,
            price: None,
            duration: None,
            location: None,
            category: None,
            difficulty: None,
            included: None,
            not_included: None,
            image_urls: None,
        };
        assert!(empty.validate().is_ok());

        let bad_price = UpdateActivityRequest {
            price: Some(-10.0),
            ..empty
        };
        assert!(bad_price.validate().is_err());
    }
}
