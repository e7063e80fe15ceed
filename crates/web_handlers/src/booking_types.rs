use chrono::NaiveDate;
use email_services::EmailProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Request structure for sending a booking confirmation. The booking itself
/// is not persisted; these structures live for the duration of the request.
#[derive(Debug, Deserialize, Validate)]
pub struct BookingConfirmationRequest {
    /// Traveler contact details
    #[validate(nested)]
    pub personal_info: PersonalInfo,

    /// Snapshot of the booked activity
    #[validate(nested)]
    pub activity: ActivitySnapshot,

    /// Date, party size, and notes
    #[validate(nested)]
    pub booking: BookingDetails,

    /// Payment stub shown on the receipt
    #[validate(nested)]
    pub payment: PaymentStub,
}

/// Traveler contact details
#[derive(Debug, Deserialize, Validate)]
pub struct PersonalInfo {
    /// Traveler first name
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,

    /// Traveler last name
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,

    /// Confirmation recipient
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    /// Contact phone
    #[validate(length(min = 6, max = 20, message = "Phone must be between 6-20 characters"))]
    pub phone: String,
}

/// Snapshot of the activity as booked; carried in the request so the
/// confirmation renders even when the catalog entry changes afterwards
#[derive(Debug, Deserialize, Validate)]
pub struct ActivitySnapshot {
    /// Catalog id, when the booking came from the catalog
    pub id: Option<Uuid>,

    /// Activity title
    #[validate(length(min = 1, max = 255, message = "Activity title is required"))]
    pub title: String,

    /// Price per participant
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    /// Duration as displayed
    #[validate(length(min = 1, max = 100, message = "Duration is required"))]
    pub duration: String,

    /// Meeting point / area
    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,
}

/// Date, party size, and traveler notes
#[derive(Debug, Deserialize, Validate)]
pub struct BookingDetails {
    /// Activity date
    pub date: NaiveDate,

    /// Number of participants
    #[validate(range(min = 1, max = 30, message = "Participants must be between 1 and 30"))]
    pub participants: i32,

    /// Free-form traveler notes
    pub special_requests: Option<String>,
}

/// Payment stub shown on the receipt; no charge is processed here
#[derive(Debug, Deserialize, Validate)]
pub struct PaymentStub {
    /// Payment method slug
    #[validate(custom(function = "validate_payment_method"))]
    pub method: String,

    /// Last four digits, for card payments
    #[validate(length(min = 4, max = 4, message = "Card digits must be exactly 4 characters"))]
    pub card_last4: Option<String>,
}

/// Response structure for a sent confirmation
#[derive(Debug, Serialize)]
pub struct BookingConfirmationResponse {
    /// Reference code the traveler quotes to the guide
    pub booking_reference: String,
    /// Provider (or simulated) message id
    pub message_id: String,
    /// Channel that handled the send
    pub provider: EmailProvider,
    /// True when no real delivery happened
    pub simulated: bool,
}

/// Custom error type for booking operations
#[derive(thiserror::Error, Debug)]
pub enum BookingError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl actix_web::ResponseError for BookingError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            BookingError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
        }
    }
}

/// Custom validation function for payment methods
pub fn validate_payment_method(method: &str) -> Result<(), validator::ValidationError> {
    match method {
        "card" | "cash" | "transfer" | "mercado_pago" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_payment_method")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_payment_methods_pass() {
        for method in ["card", "cash", "transfer", "mercado_pago"] {
            assert!(validate_payment_method(method).is_ok());
        }
    }

    #[test]
    fn unknown_payment_methods_are_rejected() {
        assert!(validate_payment_method("crypto").is_err());
    }
}
