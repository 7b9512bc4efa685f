use actix_web::{web, HttpResponse};
use serde::Deserialize;
use validator::Validate;

use super::parse_id;
use crate::error::Result;
use crate::middleware::UserId;
use crate::services::PostDraft;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(min = 1))]
    pub text: String,

    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[validate(url)]
    pub pic_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(rename = "page-number")]
    pub page_number: Option<i64>,
}

/// GET /post?page-number=N
pub async fn feed(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let page = query.page_number.unwrap_or(1);
    let posts = state.posts.feed(user.0, page).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /post
pub async fn create_post(
    state: web::Data<AppState>,
    user: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let req = req.into_inner();

    let post = state
        .posts
        .create_post(
            user.0,
            PostDraft {
                text: req.text,
                location: req.location,
                pic_url: req.pic_url,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(post))
}

/// GET /post/single/{post_id}
pub async fn single(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let post_id = parse_id(&path, "post")?;
    let post = state.posts.find(post_id).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /post/user/{username}
pub async fn by_user(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let posts = state.posts.posts_of(&path).await?;
    Ok(HttpResponse::Ok().json(posts))
}

/// POST /post/comment/{post_id}
pub async fn comment(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<String>,
    req: web::Json<CommentRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    let post_id = parse_id(&path, "post")?;

    let comment = state.posts.comment(post_id, user.0, &req.text).await?;
    Ok(HttpResponse::Created().json(comment))
}

/// DELETE /post/comment/{post_id}/{comment_id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let post_id = parse_id(&post_id, "post")?;
    let comment_id = parse_id(&comment_id, "comment")?;

    let post = state.posts.delete_comment(post_id, comment_id, user.0).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PATCH /post/like/{post_id}
pub async fn like(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let post_id = parse_id(&path, "post")?;
    let post = state.posts.like(post_id, user.0).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// PATCH /post/unlike/{post_id}
pub async fn unlike(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let post_id = parse_id(&path, "post")?;
    let post = state.posts.unlike(post_id, user.0).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// GET /post/likes/{post_id}
pub async fn likes(state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
    let post_id = parse_id(&path, "post")?;
    let users = state.posts.likes(post_id).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// DELETE /post/{post_id}
pub async fn delete_post(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let post_id = parse_id(&path, "post")?;
    let post = state.posts.delete_post(post_id, user.0).await?;
    Ok(HttpResponse::Ok().json(post))
}
