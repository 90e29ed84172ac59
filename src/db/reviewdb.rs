// db/reviewdb.rs
use async_trait::async_trait;
use sqlx::PgConnection;

use super::db::DBClient;
use crate::models::jobmodel::Review;

#[async_trait]
pub trait ReviewExt {
    async fn get_reviews_for_service(&self, service_id: i32) -> Result<Vec<Review>, sqlx::Error>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn get_reviews_for_service(&self, service_id: i32) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT r.id, r.job_id, r.rating, r.comment, r.created_at
            FROM reviews r
            JOIN jobs j ON j.id = r.job_id
            WHERE j.service_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
    }
}

/// Inserts the review only when the job has none yet. Returns `None` when a
/// review already exists. Callers hold the job row lock, so two concurrent
/// inserts for the same job serialize on it.
pub async fn insert_review_once(
    conn: &mut PgConnection,
    job_id: i32,
    rating: i32,
    comment: Option<String>,
) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (job_id, rating, comment)
        SELECT $1, $2, $3
        WHERE NOT EXISTS (SELECT 1 FROM reviews WHERE job_id = $1)
        RETURNING id, job_id, rating, comment, created_at
        "#,
    )
    .bind(job_id)
    .bind(rating)
    .bind(comment)
    .fetch_optional(conn)
    .await
}
