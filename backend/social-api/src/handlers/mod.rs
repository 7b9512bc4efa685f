/// HTTP handlers
pub mod auth;
pub mod health;
pub mod notifications;
pub mod posts;
pub mod users;
pub mod websocket;

use uuid::Uuid;

use crate::error::{AppError, Result};

/// Parse a UUID path segment, rejecting malformed ids with 400
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest(format!("Invalid {} id", what)))
}
