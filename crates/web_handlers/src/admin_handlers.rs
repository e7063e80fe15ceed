use actix_web::{HttpResponse, Result, web};
use email_services::{EmailSender, admin_notice, diagnostics_test};
use serde::Deserialize;
use validator::Validate;

/// Health check endpoint
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "service": "plan-a-backend",
        "status": "healthy",
        "timestamp": chrono::Utc::now()
    })))
}

/// Email configuration diagnostics: which channel a send would use and what
/// is (and is not) configured, with credentials masked.
pub async fn email_status(email_sender: web::Data<EmailSender>) -> Result<HttpResponse> {
    let config = email_sender.config();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "active_provider": config.active_provider(),
        "force_simulation": config.force_simulation,
        "gmail_configured": config.gmail.is_some(),
        "gmail_user": config.gmail.as_ref().map(|g| mask_address(&g.user)),
        "smtp_configured": config.smtp.is_some(),
        "smtp_host": config.smtp.as_ref().map(|s| s.host.clone()),
        "resend_configured": config.resend_api_key.is_some(),
        "from_address": config.from_address,
        "admin_email": config.admin_email,
        "max_attempts": config.policy.max_attempts
    })))
}

/// Request structure for a diagnostics test send
#[derive(Debug, Deserialize, Validate)]
pub struct TestEmailRequest {
    /// Recipient override; defaults to the configured admin address
    #[validate(email(message = "Please enter a valid email"))]
    pub to: Option<String>,
}

/// Sends a test email through the active channel and returns the outcome.
pub async fn send_test_email(
    email_sender: web::Data<EmailSender>,
    request: web::Json<TestEmailRequest>,
) -> Result<HttpResponse, AdminError> {
    request
        .validate()
        .map_err(|e| AdminError::Validation(format!("Validation error: {}", e)))?;

    let config = email_sender.config();
    let to = request.to.as_deref().unwrap_or(&config.admin_email);
    let provider_label = config.active_provider().as_str();

    log::info!("🔎 Admin test email to {} via {}", to, provider_label);

    let outcome = email_sender.send(&diagnostics_test(to, provider_label)).await;

    Ok(HttpResponse::Ok().json(outcome))
}

/// Request structure for a free-form admin notification
#[derive(Debug, Deserialize, Validate)]
pub struct AdminNotifyRequest {
    /// Subject line
    #[validate(length(min = 1, max = 255, message = "Subject is required"))]
    pub subject: String,

    /// Message body (plain text)
    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

/// Sends a free-form notification to the configured admin address.
pub async fn notify_admin(
    email_sender: web::Data<EmailSender>,
    request: web::Json<AdminNotifyRequest>,
) -> Result<HttpResponse, AdminError> {
    request
        .validate()
        .map_err(|e| AdminError::Validation(format!("Validation error: {}", e)))?;

    let admin_email = &email_sender.config().admin_email;
    let outcome = email_sender
        .send(&admin_notice(admin_email, &request.subject, &request.message))
        .await;

    Ok(HttpResponse::Ok().json(outcome))
}

/// Custom error type for admin operations
#[derive(thiserror::Error, Debug)]
pub enum AdminError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl actix_web::ResponseError for AdminError {
    fn error_response(&self) -> actix_web::HttpResponse {
        match self {
            AdminError::Validation(msg) => {
                actix_web::HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "validation_error",
                    "message": msg
                }))
            }
        }
    }
}

/// Masks an email address for diagnostics output: keeps the first two
/// characters of the local part and the full domain.
fn mask_address(address: &str) -> String {
    match address.split_once('@') {
        Some((local, domain)) => {
            let visible: String = local.chars().take(2).collect();
            format!("{}***@{}", visible, domain)
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_the_local_part_but_keeps_the_domain() {
        assert_eq!(mask_address("guides@gmail.com"), "gu***@gmail.com");
        assert_eq!(mask_address("a@b.com"), "a***@b.com");
    }

    #[test]
    fn masks_everything_when_not_an_address() {
        assert_eq!(mask_address("not-an-address"), "***");
    }
}
