use actix_web::{HttpResponse, web};
use email_services::{EmailSender, new_guide_notification};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::guide_service::GuideService;
use crate::guide_types::*;

/// Registers a guide together with their first activity, then notifies the
/// administrator by email. The notification is best-effort: a failed or
/// simulated send is logged and never fails the registration.
pub async fn register_guide(
    pool: web::Data<PgPool>,
    email_sender: web::Data<EmailSender>,
    request: web::Json<GuideRegistrationRequest>,
) -> Result<HttpResponse, GuideError> {
    request
        .validate()
        .map_err(|e| GuideError::Validation(format!("Validation error: {}", e)))?;

    let service = GuideService::new(pool.get_ref().clone());
    let (guide, activity) = service.register(&request).await?;

    log::info!(
        "🧗 Guide {} registered with activity {} (pending verification)",
        guide.id,
        activity.id
    );

    let notification = new_guide_notification(
        &email_sender.config().admin_email,
        &guide.name,
        &guide.email,
        &activity.title,
        &guide.specialties,
    );
    let outcome = email_sender.send(&notification).await;
    if let Some(error) = &outcome.error {
        log::warn!(
            "Admin notification for guide {} not delivered: {}",
            guide.id,
            error
        );
    }

    Ok(HttpResponse::Created().json(GuideRegistrationResponse { guide, activity }))
}

/// Gets a guide's public profile.
pub async fn get_guide(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, GuideError> {
    let service = GuideService::new(pool.get_ref().clone());
    let guide = service.get(&path).await?;

    Ok(HttpResponse::Ok().json(guide))
}

/// Admin listing of guides, filterable by verification state.
pub async fn list_guides(
    pool: web::Data<PgPool>,
    query: web::Query<GuideQuery>,
) -> Result<HttpResponse, GuideError> {
    let service = GuideService::new(pool.get_ref().clone());
    let guides = service.list(query.verified).await?;
    let total = guides.len() as i64;

    Ok(HttpResponse::Ok().json(ListGuidesResponse { guides, total }))
}

/// Marks a guide as verified.
pub async fn verify_guide(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, GuideError> {
    let service = GuideService::new(pool.get_ref().clone());
    let guide = service.mark_verified(&path).await?;

    log::info!("✅ Guide {} verified by admin", guide.id);

    Ok(HttpResponse::Ok().json(guide))
}
