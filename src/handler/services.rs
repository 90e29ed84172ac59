use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::Query;
use validator::Validate;

use crate::{
    dtos::{
        jobdtos::ApiResponse,
        servicedtos::{CreateServiceDto, SearchServicesQueryDto, UpdateServiceDto},
    },
    error::HttpError,
    handler::reviews::get_service_reviews,
    middleware::{auth, role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    service::search_service::parse_search,
    AppState,
};

pub fn services_handler() -> Router {
    Router::new()
        .route(
            "/",
            post(create_service)
                .layer(middleware::from_fn(|req, next| {
                    role_check(req, next, vec![UserRole::Vendor])
                }))
                .layer(middleware::from_fn(auth))
                .get(list_services),
        )
        .route("/search", get(search_services))
        .route(
            "/:service_id",
            put(update_service)
                .delete(delete_service)
                .layer(middleware::from_fn(auth))
                .get(get_service),
        )
        .route("/:service_id/reviews", get(get_service_reviews))
}

pub async fn search_services(
    Query(query_params): Query<SearchServicesQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let search = parse_search(query_params)?;
    let services = app_state.search_service.search(&search).await?;

    Ok(Json(ApiResponse::success("Services retrieved", services)))
}

pub async fn list_services(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let services = app_state.search_service.list_services().await?;

    Ok(Json(ApiResponse::success("Services retrieved", services)))
}

pub async fn get_service(
    Path(service_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let service = app_state.search_service.get_service(service_id).await?;

    Ok(Json(ApiResponse::success("Service retrieved", service)))
}

pub async fn create_service(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateServiceDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let created = app_state
        .catalog_service
        .create_service(auth.user.id, body)
        .await?;

    // respond with the same projection the read endpoints return
    let service = app_state.search_service.get_service(created.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Service created", service)),
    ))
}

pub async fn update_service(
    Path(service_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateServiceDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    app_state
        .catalog_service
        .update_service(service_id, auth.user.id, body)
        .await?;

    let service = app_state.search_service.get_service(service_id).await?;

    Ok(Json(ApiResponse::success("Service updated", service)))
}

pub async fn delete_service(
    Path(service_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .catalog_service
        .delete_service(service_id, auth.user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
