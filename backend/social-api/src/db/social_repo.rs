/// Follow graph repository
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::db::user_repo::prefixed_user_columns;
use crate::error::Result;
use crate::models::{FollowCounts, User};

#[async_trait]
pub trait SocialRepository: Send + Sync {
    /// Insert a follow edge. Returns `false` when it already existed.
    async fn add_follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool>;

    /// Remove a follow edge. Returns `false` when there was none.
    async fn remove_follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool>;

    /// Users following `user_id`, most recent first
    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<User>>;

    /// Users `user_id` follows, most recent first
    async fn following_of(&self, user_id: Uuid) -> Result<Vec<User>>;

    async fn following_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    async fn follow_counts(&self, user_id: Uuid) -> Result<FollowCounts>;
}

pub struct PgSocialRepository {
    pool: PgPool,
}

impl PgSocialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SocialRepository for PgSocialRepository {
    async fn add_follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, followed_id, created_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (follower_id, followed_id) DO NOTHING",
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(
                "Follow relationship already exists: {} -> {}",
                follower_id,
                followed_id
            );
        }

        Ok(result.rows_affected() > 0)
    }

    async fn remove_follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
            .bind(follower_id)
            .bind(followed_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<User>> {
        let columns = prefixed_user_columns();
        let sql = format!(
            "SELECT {columns} FROM follows f JOIN users u ON u.id = f.follower_id \
             WHERE f.followed_id = $1 ORDER BY f.created_at DESC"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn following_of(&self, user_id: Uuid) -> Result<Vec<User>> {
        let columns = prefixed_user_columns();
        let sql = format!(
            "SELECT {columns} FROM follows f JOIN users u ON u.id = f.followed_id \
             WHERE f.follower_id = $1 ORDER BY f.created_at DESC"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn following_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = sqlx::query("SELECT followed_id FROM follows WHERE follower_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("followed_id")).collect())
    }

    async fn follow_counts(&self, user_id: Uuid) -> Result<FollowCounts> {
        let row = sqlx::query(
            "SELECT
                (SELECT COUNT(*) FROM follows WHERE followed_id = $1) AS followers,
                (SELECT COUNT(*) FROM follows WHERE follower_id = $1) AS following",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(FollowCounts {
            followers: row.get("followers"),
            following: row.get("following"),
        })
    }
}
