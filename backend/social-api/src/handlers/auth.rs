use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{FollowStats, User};
use crate::services::Registration;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 50))]
    pub username: String,

    #[validate(length(min = 6))]
    pub password: String,

    #[validate(url)]
    pub profile_pic_url: Option<String>,

    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub youtube: String,
    #[serde(default)]
    pub instagram: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetRequestQuery {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,

    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CurrentUserQuery {
    #[serde(rename = "getFollowingData", default)]
    pub get_following_data: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub user: User,
    pub user_follow_stats: Option<FollowStats>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// GET /auth
pub async fn current_user(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<CurrentUserQuery>,
) -> Result<HttpResponse> {
    let me = state.users.find_by_id(user.0).await?;
    let user_follow_stats = if query.get_following_data {
        Some(state.users.following_data(user.0).await?)
    } else {
        None
    };

    Ok(HttpResponse::Ok().json(CurrentUserResponse {
        user: me,
        user_follow_stats,
    }))
}

/// POST /auth/register
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let req = req.into_inner();

    let user = state
        .auth
        .register(Registration {
            name: req.name,
            email: req.email,
            username: req.username,
            password: req.password,
            profile_pic_url: req.profile_pic_url,
            bio: req.bio,
            facebook: req.facebook,
            twitter: req.twitter,
            youtube: req.youtube,
            instagram: req.instagram,
        })
        .await?;

    let cookie = state.auth.session_cookie(&user)?;
    Ok(HttpResponse::Created()
        .cookie(cookie)
        .json(UserResponse { user }))
}

/// GET /auth/is-taken/{username}
pub async fn is_taken(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if state.auth.is_username_taken(&path.into_inner()).await? {
        return Err(AppError::Conflict("Username is already taken".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "available": true })))
}

/// POST /auth/login
pub async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let user = state.auth.authenticate(&req.email, &req.password).await?;
    let cookie = state.auth.session_cookie(&user)?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(HttpResponse::Ok().cookie(cookie).json(UserResponse { user }))
}

/// POST /auth/logout
pub async fn logout(state: web::Data<AppState>, user: UserId) -> Result<HttpResponse> {
    tracing::info!(user_id = %user.0, "User logged out");
    Ok(HttpResponse::Ok()
        .cookie(state.auth.logout_cookie())
        .json(serde_json::json!({ "message": "success" })))
}

/// POST /auth/reset?email=
pub async fn request_password_reset(
    state: web::Data<AppState>,
    query: web::Query<ResetRequestQuery>,
) -> Result<HttpResponse> {
    query.validate()?;
    state.auth.request_password_reset(&query.email).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Password reset email sent"
    })))
}

/// POST /auth/reset/token
pub async fn reset_password(
    state: web::Data<AppState>,
    req: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let user = state.auth.reset_password(&req.token, &req.password).await?;
    Ok(HttpResponse::Ok().json(UserResponse { user }))
}
