use sqlx::PgPool;
use uuid::Uuid;

use crate::activity_types::Activity;
use crate::guide_types::*;

const GUIDE_COLUMNS: &str =
    "id, name, email, phone, bio, specialties, verified, rating, total_reviews, \
     created_at, updated_at";

/// Service for guide registration and admin management
pub struct GuideService {
    pool: PgPool,
}

impl GuideService {
    /// Creates a new instance of `GuideService` with the provided database connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a guide and their first activity as two dependent inserts.
    ///
    /// No transaction: a failed activity insert leaves the guide row in
    /// place and is reported as a partial registration naming the failed
    /// step, so the registration can be repaired instead of re-submitted.
    pub async fn register(
        &self,
        request: &GuideRegistrationRequest,
    ) -> Result<(Guide, Activity), GuideError> {
        let sql = format!(
            r#"
            INSERT INTO guides (name, email, phone, bio, specialties)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {GUIDE_COLUMNS}
            "#
        );

        let guide = sqlx::query_as::<_, Guide>(&sql)
            .bind(&request.name)
            .bind(&request.email)
            .bind(&request.phone)
            .bind(&request.bio)
            .bind(&request.specialties)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    GuideError::EmailExists
                } else {
                    GuideError::Database(e)
                }
            })?;

        let activity = self
            .insert_activity(&guide.id, &request.activity)
            .await
            .map_err(|source| GuideError::PartialRegistration {
                guide_id: guide.id,
                source,
            })?;

        Ok((guide, activity))
    }

    async fn insert_activity(
        &self,
        guide_id: &Uuid,
        request: &NewActivityRequest,
    ) -> Result<Activity, sqlx::Error> {
        sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (
                guide_id, title, description, price, duration, location,
                category, difficulty, included, not_included, image_urls
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, guide_id, title, description, price, duration, location,
                      category, difficulty, included, not_included, image_urls,
                      rating, total_reviews, created_at, updated_at
            "#,
        )
        .bind(guide_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.price)
        .bind(&request.duration)
        .bind(&request.location)
        .bind(&request.category)
        .bind(&request.difficulty)
        .bind(&request.included)
        .bind(&request.not_included)
        .bind(&request.image_urls)
        .fetch_one(&self.pool)
        .await
    }

    /// Gets a guide by id
    pub async fn get(&self, guide_id: &Uuid) -> Result<Guide, GuideError> {
        let sql = format!("SELECT {GUIDE_COLUMNS} FROM guides WHERE id = $1");

        sqlx::query_as::<_, Guide>(&sql)
            .bind(guide_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(GuideError::NotFound)
    }

    /// Lists guides, optionally filtered by verification state, newest first
    pub async fn list(&self, verified: Option<bool>) -> Result<Vec<Guide>, GuideError> {
        let sql = format!(
            r#"
            SELECT {GUIDE_COLUMNS}
            FROM guides
            WHERE ($1::boolean IS NULL OR verified = $1)
            ORDER BY created_at DESC
            "#
        );

        let guides = sqlx::query_as::<_, Guide>(&sql)
            .bind(verified)
            .fetch_all(&self.pool)
            .await?;

        Ok(guides)
    }

    /// Marks a guide as verified
    pub async fn mark_verified(&self, guide_id: &Uuid) -> Result<Guide, GuideError> {
        let sql = format!(
            r#"
            UPDATE guides SET verified = true, updated_at = NOW()
            WHERE id = $1
            RETURNING {GUIDE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Guide>(&sql)
            .bind(guide_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(GuideError::NotFound)
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().as_deref() == Some("23505"),
        _ => false,
    }
}
