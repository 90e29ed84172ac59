use std::sync::Arc;

use axum::{
    http::StatusCode, middleware, response::IntoResponse, routing::post, Extension, Json, Router,
};
use validator::Validate;

use crate::{
    db::skilldb::SkillExt,
    dtos::{jobdtos::ApiResponse, servicedtos::SkillSummaryDto, userdtos::CreateSkillDto},
    error::HttpError,
    middleware::{auth, role_check},
    models::usermodel::UserRole,
    AppState,
};

pub fn skills_handler() -> Router {
    Router::new().route(
        "/",
        post(create_skill)
            .layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Admin])
            }))
            .layer(middleware::from_fn(auth))
            .get(get_skills),
    )
}

pub async fn get_skills(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let skills = app_state
        .db_client
        .get_skills()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let skills: Vec<SkillSummaryDto> = skills.into_iter().map(SkillSummaryDto::from).collect();

    Ok(Json(ApiResponse::success("Skills retrieved", skills)))
}

pub async fn create_skill(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<CreateSkillDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let skill = app_state
        .db_client
        .save_skill(body.name.trim().to_string(), body.description)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                HttpError::unique_constraint_violation("A skill with this name already exists")
            }
            e => HttpError::server_error(e.to_string()),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Skill created", SkillSummaryDto::from(skill))),
    ))
}
