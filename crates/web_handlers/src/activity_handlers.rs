use actix_web::{HttpResponse, web};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::activity_service::ActivityService;
use crate::activity_types::*;

/// Lists activities, filterable by category, difficulty, and location.
pub async fn list_activities(
    pool: web::Data<PgPool>,
    query: web::Query<ActivityQuery>,
) -> Result<HttpResponse, ActivityError> {
    let service = ActivityService::new(pool.get_ref().clone());
    let activities = service.list(&query).await?;
    let total = activities.len() as i64;

    Ok(HttpResponse::Ok().json(ListActivitiesResponse { activities, total }))
}

/// Gets a single activity by id.
pub async fn get_activity(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ActivityError> {
    let service = ActivityService::new(pool.get_ref().clone());
    let activity = service.get(&path).await?;

    Ok(HttpResponse::Ok().json(activity))
}

/// Applies an admin edit to an activity's mutable fields.
pub async fn update_activity(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateActivityRequest>,
) -> Result<HttpResponse, ActivityError> {
    request
        .validate()
        .map_err(|e| ActivityError::Validation(format!("Validation error: {}", e)))?;

    let service = ActivityService::new(pool.get_ref().clone());
    let activity = service.update(&path, &request).await?;

    log::info!("✏️ Activity {} updated by admin", activity.id);

    Ok(HttpResponse::Ok().json(activity))
}
