use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::{jobdb::JobExt, paymentdb::PaymentExt},
    dtos::jobdtos::{ApiResponse, CreateJobDto, SetJobStatusDto},
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    AppState,
};

pub fn jobs_handler() -> Router {
    Router::new()
        .route("/", post(create_job).get(get_jobs))
        .route("/:job_id", get(get_job))
        .route("/user/:user_id", get(get_user_jobs))
        .route("/vendor/:user_id", get(get_vendor_jobs))
        .route("/contractor/:user_id", get(get_contractor_jobs))
        .route("/:job_id/accept", put(accept_job))
        .route("/:job_id/complete", put(confirm_completion))
        .route(
            "/:job_id/status",
            put(set_job_status).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Admin])
            })),
        )
        .route("/:job_id/payments", get(get_job_payments))
}

pub async fn create_job(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateJobDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.job_service.create_job(auth.user.id, &body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Job created", job)),
    ))
}

pub async fn get_jobs(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .db_client
        .get_jobs()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Jobs retrieved", jobs)))
}

pub async fn get_job(
    Path(job_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.get_job(job_id).await?;

    Ok(Json(ApiResponse::success("Job retrieved", job)))
}

pub async fn get_user_jobs(
    Path(user_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .db_client
        .get_jobs_for_user(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Jobs retrieved", jobs)))
}

pub async fn get_vendor_jobs(
    Path(user_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .db_client
        .get_jobs_by_vendor(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Jobs retrieved", jobs)))
}

pub async fn get_contractor_jobs(
    Path(user_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let jobs = app_state
        .db_client
        .get_jobs_by_contractor(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Jobs retrieved", jobs)))
}

pub async fn accept_job(
    Path(job_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state.job_service.accept_job(job_id, auth.user.id).await?;

    Ok(Json(ApiResponse::success("Job accepted", job)))
}

pub async fn confirm_completion(
    Path(job_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let job = app_state
        .job_service
        .confirm_completion(job_id, auth.user.id)
        .await?;

    let message = if job.fully_confirmed() {
        "Job completed"
    } else {
        "Completion confirmed, waiting for the other party"
    };

    Ok(Json(ApiResponse::success(message, job)))
}

pub async fn set_job_status(
    Path(job_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<SetJobStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.job_service.set_status(job_id, &body.status).await?;

    tracing::warn!(
        "admin {} forced job {} to {}",
        auth.user.id,
        job_id,
        job.status
    );

    Ok(Json(ApiResponse::success("Job status updated", job)))
}

pub async fn get_job_payments(
    Path(job_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    app_state.job_service.get_job(job_id).await?;

    let payments = app_state
        .db_client
        .get_payments_for_job(job_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Payments retrieved", payments)))
}
