use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::db::{NotificationRepository, PostRepository, UserRepository};
use crate::error::Result;
use crate::metrics;
use crate::models::{
    NewNotification, Notification, NotificationDetails, NotificationFilter, PostSummary, User,
};
use crate::websocket::{NewNotificationPayload, ServerEvent, SocketRegistry};

pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    registry: SocketRegistry,
}

impl NotificationService {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        registry: SocketRegistry,
    ) -> Self {
        Self {
            notifications,
            users,
            posts,
            registry,
        }
    }

    /// Persist a notification and flag the recipient as having unread ones
    pub async fn notify(&self, notification: NewNotification) -> Result<Notification> {
        let created = self.notifications.create_notification(notification).await?;
        self.users
            .set_unread_notification(created.recipient_id, true)
            .await?;

        metrics::record_notification(created.notification_type.as_str());
        tracing::debug!(
            notification_id = %created.id,
            recipient_id = %created.recipient_id,
            kind = created.notification_type.as_str(),
            "Notification created"
        );
        Ok(created)
    }

    pub async fn retract(&self, filter: NotificationFilter) -> Result<u64> {
        let removed = self.notifications.delete_matching(&filter).await?;
        tracing::debug!(
            actor_id = %filter.actor_id,
            kind = filter.notification_type.as_str(),
            removed,
            "Notifications retracted"
        );
        Ok(removed)
    }

    /// Newest first, each joined with its actor and referenced post.
    /// Notifications whose actor no longer exists are skipped.
    pub async fn list_for(&self, user_id: Uuid) -> Result<Vec<NotificationDetails>> {
        let notifications = self.notifications.list_for_recipient(user_id).await?;

        let mut actor_ids: Vec<Uuid> = notifications.iter().map(|n| n.actor_id).collect();
        actor_ids.sort();
        actor_ids.dedup();
        let actors: HashMap<Uuid, User> = self
            .users
            .find_many(&actor_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut posts: HashMap<Uuid, Option<PostSummary>> = HashMap::new();
        for post_id in notifications.iter().filter_map(|n| n.post_id) {
            if !posts.contains_key(&post_id) {
                let summary = self
                    .posts
                    .find_post(post_id)
                    .await?
                    .map(|p| PostSummary::from(&p));
                posts.insert(post_id, summary);
            }
        }

        Ok(notifications
            .into_iter()
            .filter_map(|n| {
                let user = actors.get(&n.actor_id)?.clone();
                let post = n.post_id.and_then(|id| posts.get(&id).cloned().flatten());
                Some(NotificationDetails {
                    id: n.id,
                    notification_type: n.notification_type,
                    text: n.text,
                    date: n.created_at,
                    user,
                    post,
                    comment_id: n.comment_id,
                })
            })
            .collect())
    }

    /// Relay a new like to the post author's socket. Returns whether it was delivered.
    pub async fn push_new_like(&self, recipient_id: Uuid, actor: &User, post_id: Uuid) -> bool {
        let event = ServerEvent::new_notification(NewNotificationPayload {
            name: actor.name.clone(),
            profile_pic_url: actor.profile_pic_url.clone(),
            username: actor.username.clone(),
            post_id,
        });

        let delivered = self.registry.send_to_user(recipient_id, event).await;
        metrics::record_realtime_event(delivered);
        tracing::debug!(%recipient_id, %post_id, delivered, "Realtime like notification");
        delivered
    }
}
