use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, routing::post, Extension, Json, Router};
use validator::Validate;

use crate::{
    db::paymentdb::PaymentExt,
    dtos::jobdtos::{ApiResponse, CreatePaymentDto},
    error::HttpError,
    utils::decimal::money_from_f64,
    AppState,
};

pub fn payments_handler() -> Router {
    Router::new().route("/", post(create_payment))
}

pub async fn create_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreatePaymentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let job = app_state.job_service.get_job(body.job_id).await?;
    let amount = money_from_f64(body.amount).map_err(HttpError::bad_request)?;

    let payment = app_state
        .db_client
        .create_payment(job.id, amount, body.method)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    tracing::info!("payment {} recorded for job {}", payment.id, job.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Payment recorded", payment)),
    ))
}
