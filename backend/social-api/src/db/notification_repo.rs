/// Notification persistence
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewNotification, Notification, NotificationFilter};

const NOTIFICATION_COLUMNS: &str =
    "id, notification_type, recipient_id, actor_id, post_id, comment_id, text, created_at";

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification>;

    /// Delete every notification matching the filter, returning how many went away
    async fn delete_matching(&self, filter: &NotificationFilter) -> Result<u64>;

    /// Notifications addressed to `recipient_id`, newest first
    async fn list_for_recipient(&self, recipient_id: Uuid) -> Result<Vec<Notification>>;
}

pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification> {
        let sql = format!(
            "INSERT INTO notifications \
             (id, notification_type, recipient_id, actor_id, post_id, comment_id, text) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {NOTIFICATION_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Notification>(&sql)
            .bind(Uuid::new_v4())
            .bind(notification.notification_type)
            .bind(notification.recipient_id)
            .bind(notification.actor_id)
            .bind(notification.post_id)
            .bind(notification.comment_id)
            .bind(&notification.text)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn delete_matching(&self, filter: &NotificationFilter) -> Result<u64> {
        // NULL parameters act as wildcards
        let result = sqlx::query(
            "DELETE FROM notifications
             WHERE notification_type = $1
               AND actor_id = $2
               AND ($3::uuid IS NULL OR recipient_id = $3)
               AND ($4::uuid IS NULL OR post_id = $4)
               AND ($5::uuid IS NULL OR comment_id = $5)",
        )
        .bind(filter.notification_type)
        .bind(filter.actor_id)
        .bind(filter.recipient_id)
        .bind(filter.post_id)
        .bind(filter.comment_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_for_recipient(&self, recipient_id: Uuid) -> Result<Vec<Notification>> {
        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE recipient_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let notifications = sqlx::query_as::<_, Notification>(&sql)
            .bind(recipient_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(notifications)
    }
}
