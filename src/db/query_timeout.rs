// Database query timeout protection
use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::service::error::ServiceError;

pub struct QueryTimeout;

impl QueryTimeout {
    /// Run a query future, failing with `ServiceError::Timeout` when it exceeds `limit`.
    pub async fn run<F, T>(query_fn: F, limit: Duration) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match timeout(limit, query_fn).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => {
                tracing::warn!("query exceeded {:?}", limit);
                Err(ServiceError::Timeout(limit))
            }
        }
    }

    /// Default timeout for most queries (5 seconds)
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Search joins the rating aggregate over every job/review pair
    pub const AGGREGATION_TIMEOUT: Duration = Duration::from_secs(30);
}
