use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::Cookie;
use validator::Validate;

use crate::{
    db::{jobdb::JobExt, skilldb::SkillExt, userdb::UserExt},
    dtos::{jobdtos::ApiResponse, userdtos::*},
    error::{ErrorMessage, HttpError},
    middleware::{auth, JWTAuthMiddeware},
    models::usermodel::User,
    service::error::ServiceError,
    utils::{password, token},
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route(
            "/",
            get(get_users)
                .layer(middleware::from_fn(auth))
                .post(register),
        )
        .route("/login", post(login))
        .route("/:user_id/services", get(get_vendor_services))
        .route(
            "/:user_id",
            get(get_user)
                .put(update_user)
                .layer(middleware::from_fn(auth)),
        )
        .route(
            "/:user_id/skills",
            get(get_user_skills)
                .post(replace_user_skills)
                .layer(middleware::from_fn(auth)),
        )
        .route(
            "/:user_id/skills/:skill_id",
            post(add_user_skill)
                .delete(remove_user_skill)
                .layer(middleware::from_fn(auth)),
        )
        .route(
            "/:user_id/jobs-as-vendor",
            get(get_jobs_as_vendor).layer(middleware::from_fn(auth)),
        )
        .route(
            "/:user_id/jobs-as-contractor",
            get(get_jobs_as_contractor).layer(middleware::from_fn(auth)),
        )
}

async fn find_user(app_state: &AppState, user_id: i32) -> Result<User, HttpError> {
    app_state
        .db_client
        .get_user(Some(user_id), None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| ServiceError::UserNotFound(user_id).into())
}

fn ensure_self(auth: &JWTAuthMiddeware, user_id: i32) -> Result<(), HttpError> {
    if auth.user.id == user_id {
        Ok(())
    } else {
        Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()))
    }
}

pub async fn register(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<RegisterUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let existing_user = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if existing_user.is_some() {
        return Err(HttpError::unique_constraint_violation(
            ErrorMessage::EmailExist.to_string(),
        ));
    }

    let hashed_password =
        password::hash(&body.password).map_err(|e| HttpError::server_error(e.to_string()))?;

    let user = app_state
        .db_client
        .save_user(body.name, body.email, hashed_password, body.phone, body.role)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                HttpError::unique_constraint_violation(ErrorMessage::EmailExist.to_string())
            }
            e => HttpError::server_error(e.to_string()),
        })?;

    tracing::info!("registered user {} as {}", user.id, user.role.to_str());

    Ok((
        StatusCode::CREATED,
        Json(UserResponseDto {
            status: "success".to_string(),
            data: UserData {
                user: FilterUserDto::filter_user(&user),
            },
        }),
    ))
}

pub async fn login(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<LoginUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .get_user(None, Some(&body.email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    let password_matched = password::compare(&body.password, &user.password_hash)
        .map_err(|_| HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()))?;

    if !password_matched {
        return Err(HttpError::bad_request(ErrorMessage::WrongCredentials.to_string()));
    }

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let cookie_duration = time::Duration::minutes(app_state.env.jwt_maxage);
    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(cookie_duration)
        .http_only(true)
        .build();

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| HttpError::server_error("Failed to build session cookie"))?,
    );

    let mut response = Json(UserLoginResponseDto {
        status: "success".to_string(),
        token,
        user: FilterUserDto::filter_user(&user),
    })
    .into_response();
    response.headers_mut().extend(headers);

    Ok(response)
}

pub async fn get_users(
    Query(query_params): Query<RequestQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    query_params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = query_params.page.unwrap_or(1);
    let limit = query_params.limit.unwrap_or(10);

    let users = app_state
        .db_client
        .get_users(page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let user_count = app_state
        .db_client
        .get_user_count()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(UserListResponseDto {
        status: "success".to_string(),
        users: FilterUserDto::filter_users(&users),
        results: user_count,
    }))
}

pub async fn get_user(
    Path(user_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let user = find_user(&app_state, user_id).await?;

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user),
        },
    }))
}

pub async fn update_user(
    Path(user_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdateUserProfileDto>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_self(&auth, user_id)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .db_client
        .update_user_profile(
            user_id,
            body.name,
            body.phone,
            body.profile_picture_url,
            body.location,
            body.bio,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user),
        },
    }))
}

pub async fn get_user_skills(
    Path(user_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    find_user(&app_state, user_id).await?;

    let skills = app_state
        .db_client
        .get_user_skills(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("User skills retrieved", skills)))
}

pub async fn replace_user_skills(
    Path(user_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UserSkillsDto>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_self(&auth, user_id)?;

    let missing = app_state
        .db_client
        .missing_skill_ids(&body.skill_ids)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if let Some(skill_id) = missing.first() {
        return Err(ServiceError::SkillNotFound(*skill_id).into());
    }

    let skills = app_state
        .db_client
        .replace_user_skills(user_id, &body.skill_ids)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("User skills updated", skills)))
}

pub async fn add_user_skill(
    Path((user_id, skill_id)): Path<(i32, i32)>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_self(&auth, user_id)?;

    app_state
        .db_client
        .get_skill(skill_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::from(ServiceError::SkillNotFound(skill_id)))?;

    app_state
        .db_client
        .add_user_skill(user_id, skill_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let skills = app_state
        .db_client
        .get_user_skills(user_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Skill added", skills)),
    ))
}

pub async fn remove_user_skill(
    Path((user_id, skill_id)): Path<(i32, i32)>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    ensure_self(&auth, user_id)?;

    let removed = app_state
        .db_client
        .remove_user_skill(user_id, skill_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if !removed {
        return Err(HttpError::not_found(format!(
            "Skill {} is not assigned to user {}",
            skill_id, user_id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_vendor_services(
    Path(user_id): Path<i32>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let services = app_state.search_service.vendor_services(user_id).await?;

    Ok(Json(ApiResponse::success("Vendor services retrieved", services)))
}

pub async fn get_jobs_as_vendor(
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

pub async fn get_jobs_as_contractor(
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
