use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use crate::middleware::UserId;
use crate::websocket::NotificationSocket;
use crate::AppState;

/// GET /ws
///
/// Upgrades an authenticated request to the notification socket. The client
/// still has to send `join` before it receives anything.
pub async fn connect(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    user: UserId,
) -> Result<HttpResponse, Error> {
    tracing::debug!(user_id = %user.0, "WebSocket upgrade requested");
    ws::start(
        NotificationSocket::new(user.0, state.registry.clone()),
        &req,
        stream,
    )
}
