use actix_web::{web, HttpResponse};

use crate::AppState;

/// GET /health
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "social-api",
        "storage": state.storage.as_str(),
        "connectedSockets": state.registry.connection_count().await,
    }))
}
