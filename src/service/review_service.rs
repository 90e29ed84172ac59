// service/review_service.rs
use std::sync::Arc;

use crate::{
    db::{
        db::DBClient,
        jobdb::lock_job,
        reviewdb::{insert_review_once, ReviewExt},
        servicedb::ServiceExt,
    },
    dtos::{jobdtos::CreateReviewDto, servicedtos::ServiceReviewsDto},
    models::jobmodel::Review,
    service::{error::ServiceError, rating::RatingAggregator},
};

#[derive(Debug, Clone)]
pub struct ReviewService {
    db_client: Arc<DBClient>,
    ratings: RatingAggregator,
}

impl ReviewService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        let ratings = RatingAggregator::new(db_client.clone());
        Self { db_client, ratings }
    }

    /// One review per job. The job row is locked while checking so a
    /// concurrent second review sees the first.
    pub async fn create_review(&self, body: CreateReviewDto) -> Result<Review, ServiceError> {
        let mut tx = self.db_client.begin().await?;

        lock_job(&mut *tx, body.job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(body.job_id))?;

        let review = insert_review_once(&mut *tx, body.job_id, body.rating, body.comment)
            .await?
            .ok_or(ServiceError::DuplicateReview(body.job_id))?;

        tx.commit().await?;

        tracing::info!("review {} recorded for job {}", review.id, review.job_id);
        Ok(review)
    }

    pub async fn service_reviews(&self, service_id: i32) -> Result<ServiceReviewsDto, ServiceError> {
        self.db_client
            .get_service(service_id)
            .await?
            .ok_or(ServiceError::ServiceNotFound(service_id))?;

        let reviews = self.db_client.get_reviews_for_service(service_id).await?;
        let rating = self.ratings.service_rating(service_id).await?;

        Ok(ServiceReviewsDto {
            service_id,
            average_rating: rating.average_rating,
            review_count: reviews.len(),
            reviews,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::test_db::{seed_marketplace, TestDb},
        service::error::ErrorKind,
    };

    fn review(job_id: i32, rating: i32, comment: &str) -> CreateReviewDto {
        CreateReviewDto {
            job_id,
            rating,
            comment: Some(comment.to_string()),
        }
    }

    #[tokio::test]
    #[ignore = "requires postgres instance"]
    async fn second_review_conflicts_and_first_survives() {
        let db = TestDb::fresh().await;
        let market = seed_marketplace(&db.client).await.unwrap();
        let reviews = ReviewService::new(Arc::new(db.client.clone()));

        let first = reviews
            .create_review(review(market.unreviewed_job, 5, "Excelente"))
            .await
            .unwrap();
        let err = reviews
            .create_review(review(market.unreviewed_job, 1, "Cambio de opinión"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let listed = reviews.service_reviews(market.services[0]).await.unwrap();
        let for_job: Vec<_> = listed
            .reviews
            .iter()
            .filter(|r| r.job_id == market.unreviewed_job)
            .collect();
        assert_eq!(for_job.len(), 1);
        assert_eq!(for_job[0].id, first.id);
        assert_eq!((for_job[0].rating, for_job[0].comment.as_deref()), (5, Some("Excelente")));
        // 5, 2 and the new 5
        assert_eq!(listed.review_count, 3);
        assert_eq!(listed.average_rating, 4.0);

        db.teardown().await;
    }

    #[tokio::test]
    #[ignore = "requires postgres instance"]
    async fn review_for_missing_job_is_not_found() {
        let db = TestDb::fresh().await;
        seed_marketplace(&db.client).await.unwrap();
        let reviews = ReviewService::new(Arc::new(db.client.clone()));

        let err = reviews.create_review(review(i32::MAX, 4, "Bien")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        db.teardown().await;
    }
}
