// db/ratingdb.rs
use async_trait::async_trait;
use sqlx::Error;

use super::db::DBClient;

/// Per-service review aggregate. Every read path that reports a rating
/// (single service, search, vendor listing) joins against this CTE so the
/// numbers agree. Jobs without a review contribute nothing to AVG, and a
/// service with no reviews gets a NULL average that callers COALESCE to 0.
pub const REVIEWS_PER_SERVICE_CTE: &str = r#"
    WITH reviews_per_service AS (
        SELECT j.service_id AS service_id,
               AVG(r.rating)::float8 AS avg_rating,
               COUNT(r.id) AS review_count
        FROM jobs j
        LEFT JOIN reviews r ON r.job_id = j.id
        GROUP BY j.service_id
    )
"#;

#[async_trait]
pub trait RatingExt {
    async fn get_service_rating(&self, service_id: i32) -> Result<(f64, i64), Error>;
}

#[async_trait]
impl RatingExt for DBClient {
    async fn get_service_rating(&self, service_id: i32) -> Result<(f64, i64), Error> {
        let sql = format!(
            r#"
            {}
            SELECT COALESCE(rps.avg_rating, 0)::float8 AS average_rating,
                   COALESCE(rps.review_count, 0)::int8 AS review_count
            FROM (SELECT $1::int4 AS service_id) target
            LEFT JOIN reviews_per_service rps ON rps.service_id = target.service_id
            "#,
            REVIEWS_PER_SERVICE_CTE
        );

        sqlx::query_as::<_, (f64, i64)>(&sql)
            .bind(service_id)
            .fetch_one(&self.pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db::{seed_marketplace, TestDb};

    #[tokio::test]
    #[ignore = "requires postgres instance"]
    async fn average_over_none_one_and_many_reviews() {
        let db = TestDb::fresh().await;
        let market = seed_marketplace(&db.client).await.unwrap();
        let s = &market.services;

        // two reviews plus a job nobody reviewed
        assert_eq!(db.client.get_service_rating(s[0]).await.unwrap(), (3.5, 2));
        assert_eq!(db.client.get_service_rating(s[1]).await.unwrap(), (4.0, 1));
        assert_eq!(db.client.get_service_rating(s[2]).await.unwrap(), (0.0, 0));
        // unknown service
        assert_eq!(db.client.get_service_rating(i32::MAX).await.unwrap(), (0.0, 0));

        db.teardown().await;
    }
}
