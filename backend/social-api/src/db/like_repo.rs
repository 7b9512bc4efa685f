/// Post likes repository
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::user_repo::prefixed_user_columns;
use crate::error::Result;
use crate::models::User;

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Returns `false` if the user had already liked the post
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Returns `false` if there was no like to remove
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Users who liked the post, most recent like first
    async fn likers(&self, post_id: Uuid) -> Result<Vec<User>>;
}

pub struct PgLikeRepository {
    pool: PgPool,
}

impl PgLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2)
             ON CONFLICT (post_id, user_id) DO NOTHING",
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn likers(&self, post_id: Uuid) -> Result<Vec<User>> {
        let columns = prefixed_user_columns();
        let sql = format!(
            "SELECT {columns} FROM post_likes l JOIN users u ON u.id = l.user_id \
             WHERE l.post_id = $1 ORDER BY l.created_at DESC"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}
