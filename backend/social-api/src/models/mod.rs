use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Root,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_pic_url: Option<String>,
    pub unread_notification: bool,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub bio: String,
    pub facebook: String,
    pub twitter: String,
    pub youtube: String,
    pub instagram: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public part of a user shown on profile pages
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_pic_url: Option<String>,
    pub bio: String,
    pub facebook: String,
    pub twitter: String,
    pub youtube: String,
    pub instagram: String,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            profile_pic_url: user.profile_pic_url.clone(),
            bio: user.bio.clone(),
            facebook: user.facebook.clone(),
            twitter: user.twitter.clone(),
            youtube: user.youtube.clone(),
            instagram: user.instagram.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub profile: PublicProfile,
    pub followers_length: i64,
    pub following_length: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FollowCounts {
    pub followers: i64,
    pub following: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowStats {
    pub followers: Vec<User>,
    pub following: Vec<User>,
}

/// Insert payload for a user; email and username are already normalized
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub profile_pic_url: Option<String>,
    pub bio: String,
    pub facebook: String,
    pub twitter: String,
    pub youtube: String,
    pub instagram: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub bio: String,
    pub facebook: String,
    pub twitter: String,
    pub youtube: String,
    pub instagram: String,
    /// `None` keeps the current picture
    pub profile_pic_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub location: Option<String>,
    pub pic_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: Uuid,
    pub text: String,
    pub location: Option<String>,
    pub pic_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDetails {
    pub id: Uuid,
    pub text: String,
    pub date: DateTime<Utc>,
    pub user: User,
}

/// A post with its author, likers and comments (newest first)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetails {
    pub id: Uuid,
    pub text: String,
    pub location: Option<String>,
    pub pic_url: Option<String>,
    pub user: User,
    pub likes: Vec<User>,
    pub comments: Vec<CommentDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    NewLike,
    NewComment,
    NewFollower,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::NewLike => "newLike",
            NotificationType::NewComment => "newComment",
            NotificationType::NewFollower => "newFollower",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub recipient_id: Uuid,
    pub actor_id: Uuid,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub text: Option<String>,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub notification_type: NotificationType,
    pub recipient_id: Uuid,
    pub actor_id: Uuid,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub text: Option<String>,
}

impl NewNotification {
    pub fn new_follower(recipient_id: Uuid, actor_id: Uuid) -> Self {
        Self {
            notification_type: NotificationType::NewFollower,
            recipient_id,
            actor_id,
            post_id: None,
            comment_id: None,
            text: None,
        }
    }

    pub fn new_like(recipient_id: Uuid, actor_id: Uuid, post_id: Uuid) -> Self {
        Self {
            notification_type: NotificationType::NewLike,
            recipient_id,
            actor_id,
            post_id: Some(post_id),
            comment_id: None,
            text: None,
        }
    }

    pub fn new_comment(
        recipient_id: Uuid,
        actor_id: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
        text: &str,
    ) -> Self {
        Self {
            notification_type: NotificationType::NewComment,
            recipient_id,
            actor_id,
            post_id: Some(post_id),
            comment_id: Some(comment_id),
            text: Some(text.to_string()),
        }
    }
}

/// Conjunctive match used to retract notifications; `None` fields match anything
#[derive(Debug, Clone)]
pub struct NotificationFilter {
    pub notification_type: NotificationType,
    pub actor_id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
}

impl NotificationFilter {
    pub fn matches(&self, notification: &Notification) -> bool {
        notification.notification_type == self.notification_type
            && notification.actor_id == self.actor_id
            && self
                .recipient_id
                .map_or(true, |id| notification.recipient_id == id)
            && self
                .post_id
                .map_or(true, |id| notification.post_id == Some(id))
            && self
                .comment_id
                .map_or(true, |id| notification.comment_id == Some(id))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: Uuid,
    pub text: String,
    pub pic_url: Option<String>,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            text: post.text.clone(),
            pic_url: post.pic_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDetails {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub text: Option<String>,
    pub date: DateTime<Utc>,
    pub user: User,
    pub post: Option<PostSummary>,
    pub comment_id: Option<Uuid>,
}
