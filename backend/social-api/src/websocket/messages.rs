use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent by the browser, tagged by `event`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    Join {
        #[serde(rename = "userId", default)]
        user_id: Option<Uuid>,
    },
    Leave,
}

/// Envelope for everything pushed to the browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerEvent {
    pub event: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotificationPayload {
    pub name: String,
    pub profile_pic_url: Option<String>,
    pub username: String,
    pub post_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedUser {
    pub user_id: Uuid,
    pub socket_id: Uuid,
}

impl ServerEvent {
    pub const NEW_NOTIFICATION: &'static str = "newNotificationReceived";
    pub const CONNECTED_USERS: &'static str = "connectedUsers";
    pub const ERROR: &'static str = "error";

    pub fn new_notification(payload: NewNotificationPayload) -> Self {
        Self {
            event: Self::NEW_NOTIFICATION.to_string(),
            data: serde_json::to_value(payload).unwrap_or_default(),
        }
    }

    pub fn connected_users(users: Vec<ConnectedUser>) -> Self {
        Self {
            event: Self::CONNECTED_USERS.to_string(),
            data: serde_json::json!({ "users": users }),
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            event: Self::ERROR.to_string(),
            data: serde_json::json!({ "code": code, "message": message }),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_events() {
        let id = Uuid::new_v4();
        let join: ClientEvent =
            serde_json::from_str(&format!(r#"{{"event":"join","userId":"{id}"}}"#)).unwrap();
        assert_eq!(join, ClientEvent::Join { user_id: Some(id) });

        let bare: ClientEvent = serde_json::from_str(r#"{"event":"join"}"#).unwrap();
        assert_eq!(bare, ClientEvent::Join { user_id: None });

        let leave: ClientEvent = serde_json::from_str(r#"{"event":"leave"}"#).unwrap();
        assert_eq!(leave, ClientEvent::Leave);

        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"dance"}"#).is_err());
    }

    #[test]
    fn test_new_notification_shape() {
        let post_id = Uuid::new_v4();
        let event = ServerEvent::new_notification(NewNotificationPayload {
            name: "Jane".into(),
            profile_pic_url: None,
            username: "jane".into(),
            post_id,
        });

        let json: serde_json::Value = serde_json::from_str(&event.to_json()).unwrap();
        assert_eq!(json["event"], "newNotificationReceived");
        assert_eq!(json["data"]["username"], "jane");
        assert_eq!(json["data"]["postId"], post_id.to_string());
        assert!(json["data"]["profilePicUrl"].is_null());
    }
}
