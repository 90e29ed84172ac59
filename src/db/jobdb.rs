// db/jobdb.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{types::BigDecimal, PgConnection};

use super::db::DBClient;
use crate::models::jobmodel::{Job, JobStatus};

const JOB_COLUMNS: &str = r#"
    id, contractor_id, vendor_id, service_id, status, start_date, end_date,
    total_amount, client_confirmed, vendor_confirmed, created_at, updated_at
"#;

#[async_trait]
pub trait JobExt {
    async fn create_job(
        &self,
        contractor_id: i32,
        vendor_id: i32,
        service_id: i32,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        total_amount: BigDecimal,
    ) -> Result<Job, sqlx::Error>;

    async fn get_job(&self, job_id: i32) -> Result<Option<Job>, sqlx::Error>;

    async fn get_jobs(&self) -> Result<Vec<Job>, sqlx::Error>;

    /// Jobs where the user is on either side.
    async fn get_jobs_for_user(&self, user_id: i32) -> Result<Vec<Job>, sqlx::Error>;

    async fn get_jobs_by_vendor(&self, vendor_id: i32) -> Result<Vec<Job>, sqlx::Error>;

    async fn get_jobs_by_contractor(&self, contractor_id: i32) -> Result<Vec<Job>, sqlx::Error>;
}

#[async_trait]
impl JobExt for DBClient {
    async fn create_job(
        &self,
        contractor_id: i32,
        vendor_id: i32,
        service_id: i32,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        total_amount: BigDecimal,
    ) -> Result<Job, sqlx::Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs
            (contractor_id, vendor_id, service_id, status, start_date, end_date,
             total_amount, client_confirmed, vendor_confirmed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, FALSE)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(contractor_id)
        .bind(vendor_id)
        .bind(service_id)
        .bind(JobStatus::Pending)
        .bind(start_date)
        .bind(end_date)
        .bind(total_amount)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_job(&self, job_id: i32) -> Result<Option<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>(&format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS))
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_jobs(&self) -> Result<Vec<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>(&format!("SELECT {} FROM jobs ORDER BY id ASC", JOB_COLUMNS))
            .fetch_all(&self.pool)
            .await
    }

    async fn get_jobs_for_user(&self, user_id: i32) -> Result<Vec<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {} FROM jobs
            WHERE contractor_id = $1 OR vendor_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
            JOB_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_jobs_by_vendor(&self, vendor_id: i32) -> Result<Vec<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE vendor_id = $1 ORDER BY created_at DESC, id DESC",
            JOB_COLUMNS
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_jobs_by_contractor(&self, contractor_id: i32) -> Result<Vec<Job>, sqlx::Error> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {} FROM jobs WHERE contractor_id = $1 ORDER BY created_at DESC, id DESC",
            JOB_COLUMNS
        ))
        .bind(contractor_id)
        .fetch_all(&self.pool)
        .await
    }
}

/// Reads the job row and holds its row lock until the surrounding
/// transaction ends.
pub async fn lock_job(conn: &mut PgConnection, job_id: i32) -> Result<Option<Job>, sqlx::Error> {
    sqlx::query_as::<_, Job>(&format!(
        "SELECT {} FROM jobs WHERE id = $1 FOR UPDATE",
        JOB_COLUMNS
    ))
    .bind(job_id)
    .fetch_optional(conn)
    .await
}

/// Persists status and both confirmation flags in one statement.
pub async fn write_job_state(
    conn: &mut PgConnection,
    job_id: i32,
    status: JobStatus,
    client_confirmed: bool,
    vendor_confirmed: bool,
) -> Result<Job, sqlx::Error> {
    sqlx::query_as::<_, Job>(&format!(
        r#"
        UPDATE jobs
        SET status = $2,
            client_confirmed = $3,
            vendor_confirmed = $4,
            updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        JOB_COLUMNS
    ))
    .bind(job_id)
    .bind(status)
    .bind(client_confirmed)
    .bind(vendor_confirmed)
    .fetch_one(conn)
    .await
}
