// db/paymentdb.rs
use async_trait::async_trait;
use sqlx::types::BigDecimal;

use super::db::DBClient;
use crate::models::jobmodel::Payment;

pub const PAYMENT_STATUS_PENDING: &str = "pending";

#[async_trait]
pub trait PaymentExt {
    async fn create_payment(
        &self,
        job_id: i32,
        amount: BigDecimal,
        method: Option<String>,
    ) -> Result<Payment, sqlx::Error>;

    async fn get_payments_for_job(&self, job_id: i32) -> Result<Vec<Payment>, sqlx::Error>;
}

#[async_trait]
impl PaymentExt for DBClient {
    async fn create_payment(
        &self,
        job_id: i32,
        amount: BigDecimal,
        method: Option<String>,
    ) -> Result<Payment, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (job_id, amount, method, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, job_id, amount, method, status, created_at
            "#,
        )
        .bind(job_id)
        .bind(amount)
        .bind(method)
        .bind(PAYMENT_STATUS_PENDING)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_payments_for_job(&self, job_id: i32) -> Result<Vec<Payment>, sqlx::Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, job_id, amount, method, status, created_at
            FROM payments
            WHERE job_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
    }
}
