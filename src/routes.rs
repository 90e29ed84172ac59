use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        jobs::jobs_handler, payments::payments_handler, reviews::reviews_handler,
        services::services_handler, skills::skills_handler, users::users_handler,
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/users", users_handler())
        .nest("/skills", skills_handler())
        .nest("/services", services_handler())
        .nest("/jobs", jobs_handler().layer(middleware::from_fn(auth)))
        .nest("/reviews", reviews_handler())
        .nest("/payments", payments_handler().layer(middleware::from_fn(auth)))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
