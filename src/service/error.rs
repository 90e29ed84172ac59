use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

use crate::{error::HttpError, models::jobmodel::JobStatus};

/// Coarse classification used by handlers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidState,
    InvalidArgument,
    Conflict,
    Internal,
}

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service {0} not found")]
    ServiceNotFound(i32),

    #[error("Job {0} not found")]
    JobNotFound(i32),

    #[error("User {0} not found")]
    UserNotFound(i32),

    #[error("Skill {0} not found")]
    SkillNotFound(i32),

    #[error("User {0} is not authorized to perform this action on job {1}")]
    UnauthorizedJobAccess(i32, i32),

    #[error("User {0} is not authorized to modify service {1}")]
    UnauthorizedServiceAccess(i32, i32),

    #[error("{0}")]
    Forbidden(String),

    #[error("Job {job_id} is {status}; cannot {action}")]
    InvalidJobStatus {
        job_id: i32,
        status: JobStatus,
        action: &'static str,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("A review already exists for job {0}")]
    DuplicateReview(i32),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::ServiceNotFound(_)
            | ServiceError::JobNotFound(_)
            | ServiceError::UserNotFound(_)
            | ServiceError::SkillNotFound(_) => ErrorKind::NotFound,

            ServiceError::UnauthorizedJobAccess(_, _)
            | ServiceError::UnauthorizedServiceAccess(_, _)
            | ServiceError::Forbidden(_) => ErrorKind::Forbidden,

            ServiceError::InvalidJobStatus { .. } => ErrorKind::InvalidState,

            ServiceError::InvalidArgument(_) => ErrorKind::InvalidArgument,

            ServiceError::DuplicateReview(_) => ErrorKind::Conflict,

            ServiceError::Timeout(_) | ServiceError::Database(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::InvalidState | ErrorKind::InvalidArgument | ErrorKind::Conflict => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::Internal => match self {
                ServiceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ServiceError::InvalidArgument(message.into())
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        if status.is_server_error() {
            tracing::error!("service error: {}", error);
        }
        HttpError::new(error.to_string(), status)
    }
}
