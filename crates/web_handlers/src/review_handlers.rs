use actix_web::{HttpResponse, web};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::review_service::ReviewService;
use crate::review_types::*;

/// Submits a review and returns the recomputed aggregates.
pub async fn create_review(
    pool: web::Data<PgPool>,
    request: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, ReviewError> {
    request
        .validate()
        .map_err(|e| ReviewError::Validation(format!("Validation error: {}", e)))?;

    let service = ReviewService::new(pool.get_ref().clone());
    let (review, guide, activity) = service.create_review(&request).await?;

    log::info!(
        "⭐ Review {} stored for guide {} (new average {:.1})",
        review.id,
        review.guide_id,
        guide.average
    );

    Ok(HttpResponse::Created().json(CreateReviewResponse {
        review,
        guide,
        activity,
    }))
}

/// Lists reviews for a guide.
pub async fn list_guide_reviews(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ReviewError> {
    let service = ReviewService::new(pool.get_ref().clone());
    let reviews = service.list_for_guide(&path).await?;
    let total = reviews.len() as i64;

    Ok(HttpResponse::Ok().json(ListReviewsResponse { reviews, total }))
}

/// Lists reviews for an activity.
pub async fn list_activity_reviews(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ReviewError> {
    let service = ReviewService::new(pool.get_ref().clone());
    let reviews = service.list_for_activity(&path).await?;
    let total = reviews.len() as i64;

    Ok(HttpResponse::Ok().json(ListReviewsResponse { reviews, total }))
}
