// service/job_service.rs
use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::types::BigDecimal;

use crate::{
    db::{
        db::DBClient,
        jobdb::{lock_job, write_job_state, JobExt},
        query_timeout::QueryTimeout,
        servicedb::ServiceExt,
    },
    dtos::jobdtos::CreateJobDto,
    models::{jobmodel::Job, servicemodel::Service},
    service::{
        error::ServiceError,
        lifecycle::{self, JobState},
    },
    utils::decimal::money_from_f64,
};

/// Values of a job row about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub contractor_id: i32,
    pub vendor_id: i32,
    pub service_id: i32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_amount: BigDecimal,
}

/// Checks a job request against the service it books. The amount falls back
/// to the service's current price.
pub fn prepare_job(
    service: &Service,
    acting_user: i32,
    body: &CreateJobDto,
) -> Result<NewJob, ServiceError> {
    if body.contractor_id != acting_user {
        return Err(ServiceError::Forbidden(format!(
            "User {} can only create jobs as the contractor",
            acting_user
        )));
    }

    if body.vendor_id != service.vendor_id {
        return Err(ServiceError::invalid_argument(format!(
            "vendor_id {} does not offer service {}",
            body.vendor_id, service.id
        )));
    }

    if let (Some(start), Some(end)) = (body.start_date, body.end_date) {
        if end < start {
            return Err(ServiceError::invalid_argument(
                "end_date must not be before start_date",
            ));
        }
    }

    let total_amount = match body.total_amount {
        Some(amount) if amount < 0.0 => {
            return Err(ServiceError::invalid_argument(
                "total_amount must not be negative",
            ))
        }
        Some(amount) => money_from_f64(amount).map_err(ServiceError::InvalidArgument)?,
        None => service.price.clone(),
    };

    Ok(NewJob {
        contractor_id: body.contractor_id,
        vendor_id: body.vendor_id,
        service_id: service.id,
        start_date: body.start_date,
        end_date: body.end_date,
        total_amount,
    })
}

#[derive(Debug, Clone)]
pub struct JobService {
    db_client: Arc<DBClient>,
}

impl JobService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn create_job(&self, acting_user: i32, body: &CreateJobDto) -> Result<Job, ServiceError> {
        let service = self
            .db_client
            .get_service(body.service_id)
            .await?
            .ok_or(ServiceError::ServiceNotFound(body.service_id))?;

        let new_job = prepare_job(&service, acting_user, body)?;

        let job = self
            .db_client
            .create_job(
                new_job.contractor_id,
                new_job.vendor_id,
                new_job.service_id,
                new_job.start_date,
                new_job.end_date,
                new_job.total_amount,
            )
            .await?;

        tracing::info!(
            "job {} created for service {} by contractor {}",
            job.id,
            job.service_id,
            job.contractor_id
        );

        Ok(job)
    }

    pub async fn get_job(&self, job_id: i32) -> Result<Job, ServiceError> {
        QueryTimeout::run(self.db_client.get_job(job_id), QueryTimeout::DEFAULT_TIMEOUT)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))
    }

    pub async fn accept_job(&self, job_id: i32, acting_user: i32) -> Result<Job, ServiceError> {
        self.transition(job_id, "accept", |job| lifecycle::accept(job, acting_user).map(Some))
            .await
    }

    pub async fn confirm_completion(&self, job_id: i32, acting_user: i32) -> Result<Job, ServiceError> {
        self.transition(job_id, "confirm", |job| {
            lifecycle::confirm_completion(job, acting_user)
        })
        .await
    }

    /// Rejects an unknown literal before the job row is looked up.
    pub async fn set_status(&self, job_id: i32, literal: &str) -> Result<Job, ServiceError> {
        let status = lifecycle::parse_status(literal)?;
        self.transition(job_id, "set status", |job| {
            Ok(Some(lifecycle::override_status(job, status)))
        })
        .await
    }

    /// Locks the job row, lets `decide` compute the next state and writes it
    /// in the same transaction. `Ok(None)` from `decide` leaves the row as is.
    async fn transition<F>(&self, job_id: i32, action: &str, decide: F) -> Result<Job, ServiceError>
    where
        F: FnOnce(&Job) -> Result<Option<JobState>, ServiceError>,
    {
        let mut tx = self.db_client.begin().await?;

        let job = lock_job(&mut *tx, job_id)
            .await?
            .ok_or(ServiceError::JobNotFound(job_id))?;

        let Some(next) = decide(&job)? else {
            tx.commit().await?;
            tracing::debug!("{} on job {} changed nothing", action, job_id);
            return Ok(job);
        };

        let updated = write_job_state(
            &mut *tx,
            job_id,
            next.status,
            next.client_confirmed,
            next.vendor_confirmed,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            "{} on job {}: {} -> {}",
            action,
            job_id,
            job.status,
            updated.status
        );

        Ok(updated)
    }
}
