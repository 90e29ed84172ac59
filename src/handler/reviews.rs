use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::jobdtos::{ApiResponse, CreateReviewDto},
    error::HttpError,
    middleware::auth,
    AppState,
};

pub fn reviews_handler() -> Router {
    Router::new()
        .route("/", post(create_review).layer(middleware::from_fn(auth)))
        .route("/service/:service_id", get(get_service_reviews))
}

pub async fn create_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let review = app_state.review_service.create_review(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Review created", review)),
    ))
}

pub async fn get_service_reviews(
    Path(service_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let reviews = app_state.review_service.service_reviews(service_id).await?;

    Ok(Json(ApiResponse::success("Service reviews retrieved", reviews)))
}
