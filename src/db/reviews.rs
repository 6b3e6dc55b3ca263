use sqlx::{PgExecutor, PgPool, Row};
use uuid::Uuid;

use crate::models::review::{RatingSummary, Review};

pub async fn create_review(
    pool: &PgPool,
    application_id: Uuid,
    reviewer_id: Uuid,
    reviewee_id: Uuid,
    rating: i32,
    comment: Option<&str>,
) -> Result<Review, sqlx::Error> {
    sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (application_id, reviewer_id, reviewee_id, rating, comment)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, application_id, reviewer_id, reviewee_id, rating, comment, created_at
        "#,
    )
    .bind(application_id)
    .bind(reviewer_id)
    .bind(reviewee_id)
    .bind(rating)
    .bind(comment)
    .fetch_one(pool)
    .await
}

/// Reviews received by a profile, newest first.
pub async fn list_for_reviewee(
    pool: &PgPool,
    reviewee_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Review>, sqlx::Error> {
    sqlx::query_as::<_, Review>(
        r#"
        SELECT id, application_id, reviewer_id, reviewee_id, rating, comment, created_at
        FROM reviews
        WHERE reviewee_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(reviewee_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn rating_summary<'e>(
    executor: impl PgExecutor<'e>,
    reviewee_id: Uuid,
) -> Result<RatingSummary, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT AVG(rating)::FLOAT8 AS average, COUNT(*) AS count
        FROM reviews
        WHERE reviewee_id = $1
        "#,
    )
    .bind(reviewee_id)
    .fetch_one(executor)
    .await?;

    Ok(RatingSummary::from_parts(
        row.try_get("average")?,
        row.try_get("count")?,
    ))
}
