use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::review_types::*;

/// Service for review persistence and rating aggregation
pub struct ReviewService {
    pool: PgPool,
}

impl ReviewService {
    /// Creates a new instance of `ReviewService` with the provided database connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores a review and recomputes the affected aggregates.
    ///
    /// Aggregates are recomputed by re-reading every rating for the guide
    /// (and activity) and writing the mean back; concurrent submissions are
    /// last-write-wins on the recomputed value.
    pub async fn create_review(
        &self,
        request: &CreateReviewRequest,
    ) -> Result<(Review, RatingSummary, Option<RatingSummary>), ReviewError> {
        if !(1..=5).contains(&request.rating) {
            return Err(ReviewError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        self.ensure_guide_exists(&request.guide_id).await?;
        if let Some(activity_id) = &request.activity_id {
            self.ensure_activity_exists(activity_id).await?;
        }

        let row = sqlx::query(
            r#"
            INSERT INTO reviews (guide_id, activity_id, user_id, author_name, rating, comment)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, guide_id, activity_id, user_id, author_name, rating, comment, created_at
            "#,
        )
        .bind(request.guide_id)
        .bind(request.activity_id)
        .bind(request.user_id)
        .bind(&request.author_name)
        .bind(request.rating)
        .bind(&request.comment)
        .fetch_one(&self.pool)
        .await?;

        let review = Review {
            id: row.get("id"),
            guide_id: row.get("guide_id"),
            activity_id: row.get("activity_id"),
            user_id: row.get("user_id"),
            author_name: row.get("author_name"),
            rating: row.get("rating"),
            comment: row.get("comment"),
            created_at: row.get("created_at"),
        };

        let guide_summary = self.recompute_guide_rating(&request.guide_id).await?;
        let activity_summary = match &request.activity_id {
            Some(activity_id) => Some(self.recompute_activity_rating(activity_id).await?),
            None => None,
        };

        Ok((review, guide_summary, activity_summary))
    }

    /// Lists reviews for a guide, newest first
    pub async fn list_for_guide(&self, guide_id: &Uuid) -> Result<Vec<Review>, ReviewError> {
        self.ensure_guide_exists(guide_id).await?;

        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT r.id, r.guide_id, r.activity_id, r.user_id,
                   COALESCE(up.display_name, r.author_name) AS author_name,
                   r.rating, r.comment, r.created_at
            FROM reviews r
            LEFT JOIN user_profiles up ON r.user_id = up.id
            WHERE r.guide_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(guide_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    /// Lists reviews for an activity, newest first
    pub async fn list_for_activity(&self, activity_id: &Uuid) -> Result<Vec<Review>, ReviewError> {
        self.ensure_activity_exists(activity_id).await?;

        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT r.id, r.guide_id, r.activity_id, r.user_id,
                   COALESCE(up.display_name, r.author_name) AS author_name,
                   r.rating, r.comment, r.created_at
            FROM reviews r
            LEFT JOIN user_profiles up ON r.user_id = up.id
            WHERE r.activity_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn ensure_guide_exists(&self, guide_id: &Uuid) -> Result<(), ReviewError> {
        sqlx::query("SELECT id FROM guides WHERE id = $1")
            .bind(guide_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or(ReviewError::GuideNotFound)
    }

    async fn ensure_activity_exists(&self, activity_id: &Uuid) -> Result<(), ReviewError> {
        sqlx::query("SELECT id FROM activities WHERE id = $1")
            .bind(activity_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|_| ())
            .ok_or(ReviewError::ActivityNotFound)
    }

    async fn recompute_guide_rating(&self, guide_id: &Uuid) -> Result<RatingSummary, ReviewError> {
        let rows = sqlx::query("SELECT rating FROM reviews WHERE guide_id = $1")
            .bind(guide_id)
            .fetch_all(&self.pool)
            .await?;

        let ratings: Vec<i32> = rows.iter().map(|row| row.get("rating")).collect();
        let summary = RatingSummary {
            average: average_rating(&ratings),
            count: ratings.len() as i64,
        };

        sqlx::query(
            "UPDATE guides SET rating = $2, total_reviews = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(guide_id)
        .bind(summary.average)
        .bind(summary.count as i32)
        .execute(&self.pool)
        .await?;

        Ok(summary)
    }

    async fn recompute_activity_rating(
        &self,
        activity_id: &Uuid,
    ) -> Result<RatingSummary, ReviewError> {
        let rows = sqlx::query("SELECT rating FROM reviews WHERE activity_id = $1")
            .bind(activity_id)
            .fetch_all(&self.pool)
            .await?;

        let ratings: Vec<i32> = rows.iter().map(|row| row.get("rating")).collect();
        let summary = RatingSummary {
            average: average_rating(&ratings),
            count: ratings.len() as i64,
        };

        sqlx::query(
            "UPDATE activities SET rating = $2, total_reviews = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(activity_id)
        .bind(summary.average)
        .bind(summary.count as i32)
        .execute(&self.pool)
        .await?;

        Ok(summary)
    }
}

/// Arithmetic mean of the collected ratings, rounded to one decimal.
/// An empty set averages to zero (a guide with no reviews yet).
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }

    let sum: i32 = ratings.iter().sum();
    ((sum as f64 / ratings.len() as f64) * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ratings_average_to_zero() {
        assert_eq!(average_rating(&[]), 0.0);
    }

    #[test]
    fn single_rating_is_its_own_average() {
        assert_eq!(average_rating(&[4]), 4.0);
    }

    #[test]
    fn mean_is_rounded_to_one_decimal() {
        assert_eq!(average_rating(&[5, 4]), 4.5);
        assert_eq!(average_rating(&[5, 4, 4]), 4.3);
        assert_eq!(average_rating(&[1, 1, 2]), 1.3);
        assert_eq!(average_rating(&[2, 3]), 2.5);
    }
}
