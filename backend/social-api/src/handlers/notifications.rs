use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::middleware::UserId;
use crate::AppState;

/// GET /notifications
pub async fn list(state: web::Data<AppState>, user: UserId) -> Result<HttpResponse> {
    let notifications = state.notifications.list_for(user.0).await?;
    Ok(HttpResponse::Ok().json(notifications))
}
