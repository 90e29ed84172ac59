// service/rating.rs
use std::sync::Arc;

use crate::{
    db::{db::DBClient, query_timeout::QueryTimeout, ratingdb::RatingExt},
    service::error::ServiceError,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceRating {
    pub average_rating: f64,
    pub review_count: i64,
}

/// Single entry point for a service's rating outside the search projection.
/// Both paths read the same `reviews_per_service` aggregate.
#[derive(Debug, Clone)]
pub struct RatingAggregator {
    db_client: Arc<DBClient>,
}

impl RatingAggregator {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn service_rating(&self, service_id: i32) -> Result<ServiceRating, ServiceError> {
        let (average_rating, review_count) = QueryTimeout::run(
            self.db_client.get_service_rating(service_id),
            QueryTimeout::AGGREGATION_TIMEOUT,
        )
        .await?;

        Ok(ServiceRating {
            average_rating,
            review_count,
        })
    }
}
