use sqlx::PgPool;
use uuid::Uuid;

use crate::activity_types::*;

const ACTIVITY_COLUMNS: &str = "id, guide_id, title, description, price, duration, location, \
     category, difficulty, included, not_included, image_urls, rating, total_reviews, \
     created_at, updated_at";

/// Service for activity browsing and admin edits
pub struct ActivityService {
    pool: PgPool,
}

impl ActivityService {
    /// Creates a new instance of `ActivityService` with the provided database connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists activities matching the browse filters, best-rated first
    pub async fn list(&self, query: &ActivityQuery) -> Result<Vec<Activity>, ActivityError> {
        let sql = format!(
            r#"
            SELECT {ACTIVITY_COLUMNS}
            FROM activities
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR difficulty = $2)
              AND ($3::text IS NULL OR location ILIKE '%' || $3 || '%')
            ORDER BY rating DESC, total_reviews DESC, created_at DESC
            "#
        );

        let activities = sqlx::query_as::<_, Activity>(&sql)
            .bind(query.category.as_deref())
            .bind(query.difficulty.as_deref())
            .bind(query.location.as_deref())
            .fetch_all(&self.pool)
            .await?;

        Ok(activities)
    }

    /// Gets a single activity by id
    pub async fn get(&self, activity_id: &Uuid) -> Result<Activity, ActivityError> {
        let sql = format!("SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = $1");

        sqlx::query_as::<_, Activity>(&sql)
            .bind(activity_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ActivityError::NotFound)
    }

    /// Applies an admin edit; absent fields keep their current value
    pub async fn update(
        &self,
        activity_id: &Uuid,
        request: &UpdateActivityRequest,
    ) -> Result<Activity, ActivityError> {
        let sql = format!(
            r#"
            UPDATE activities SET
                title = COALESCE($2::text, title),
                description = COALESCE($3::text, description),
                price = COALESCE($4::float8, price),
                duration = COALESCE($5::text, duration),
                location = COALESCE($6::text, location),
                category = COALESCE($7::text, category),
                difficulty = COALESCE($8::text, difficulty),
                included = COALESCE($9::text[], included),
                not_included = COALESCE($10::text[], not_included),
                image_urls = COALESCE($11::text[], image_urls),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ACTIVITY_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Activity>(&sql)
            .bind(activity_id)
            .bind(request.title.as_deref())
            .bind(request.description.as_deref())
            .bind(request.price)
            .bind(request.duration.as_deref())
            .bind(request.location.as_deref())
            .bind(request.category.as_deref())
            .bind(request.difficulty.as_deref())
            .bind(request.included.as_deref())
            .bind(request.not_included.as_deref())
            .bind(request.image_urls.as_deref())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ActivityError::NotFound)
    }
}
