use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use super::parse_id;
use crate::error::Result;
use crate::middleware::UserId;
use crate::models::ProfileUpdate;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub bio: String,
    #[serde(default)]
    pub facebook: String,
    #[serde(default)]
    pub twitter: String,
    #[serde(default)]
    pub youtube: String,
    #[serde(default)]
    pub instagram: String,

    /// New picture, already uploaded
    #[validate(url)]
    pub profile_pic_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 6))]
    pub new_password: String,
}

/// GET /user/info/{user_id}
pub async fn info(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let user_id = parse_id(&path, "user")?;
    let user = state.users.find_by_id(user_id).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// GET /user/profile/{username}
pub async fn profile(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let profile = state.users.profile(&path).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PATCH /user/update
pub async fn update_profile(
    state: web::Data<AppState>,
    user: UserId,
    req: web::Json<ProfileUpdateRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let req = req.into_inner();

    let updated = state
        .users
        .update_profile(
            user.0,
            ProfileUpdate {
                bio: req.bio,
                facebook: req.facebook,
                twitter: req.twitter,
                youtube: req.youtube,
                instagram: req.instagram,
                profile_pic_url: req.profile_pic_url.filter(|u| !u.trim().is_empty()),
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// GET /user/search/{query}
pub async fn search(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let results = state.users.search(&path, user.0).await?;
    Ok(HttpResponse::Ok().json(results))
}

/// PATCH /user/follow/{user_id}
pub async fn follow(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let target_id = parse_id(&path, "user")?;
    let me = state.users.follow(user.0, target_id).await?;
    Ok(HttpResponse::Ok().json(me))
}

/// PATCH /user/unfollow/{user_id}
pub async fn unfollow(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let target_id = parse_id(&path, "user")?;
    let me = state.users.unfollow(user.0, target_id).await?;
    Ok(HttpResponse::Ok().json(me))
}

/// GET /user/followers/{user_id}
pub async fn followers(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let user_id = parse_id(&path, "user")?;
    let users = state.users.followers(user_id).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /user/following/{user_id}
pub async fn following(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let user_id = parse_id(&path, "user")?;
    let users = state.users.following(user_id).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// PATCH /user/notifications
pub async fn mark_notifications_read(
    state: web::Data<AppState>,
    user: UserId,
) -> Result<HttpResponse> {
    let me = state.users.mark_notifications_read(user.0).await?;
    Ok(HttpResponse::Ok().json(me))
}

/// PATCH /user/settings/update-password
pub async fn update_password(
    state: web::Data<AppState>,
    user: UserId,
    req: web::Json<UpdatePasswordRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let me = state
        .users
        .update_password(user.0, &req.current_password, &req.new_password)
        .await?;
    Ok(HttpResponse::Ok().json(me))
}
