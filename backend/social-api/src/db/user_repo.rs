/// User persistence
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewUser, ProfileUpdate, User};

pub(crate) const USER_COLUMNS: &str = "id, name, email, username, password_hash, profile_pic_url, \
     unread_notification, role, reset_token_hash, reset_token_expires_at, \
     bio, facebook, twitter, youtube, instagram, created_at, updated_at";

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, new_user: NewUser) -> Result<User>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>>;

    /// Fetch several users, preserving the order of `ids`; missing ids are skipped
    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>>;

    /// Case-insensitive substring match on the display name
    async fn search_by_name(&self, query: &str, exclude: Uuid, limit: i64) -> Result<Vec<User>>;

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>>;

    /// Store a new password hash and clear any pending reset token
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<Option<User>>;

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()>;

    async fn set_unread_notification(&self, id: Uuid, unread: bool) -> Result<Option<User>>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (id, name, email, username, password_hash, profile_pic_url, \
             bio, facebook, twitter, youtube, instagram) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {USER_COLUMNS}"
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.name)
            .bind(&new_user.email)
            .bind(&new_user.username)
            .bind(&new_user.password_hash)
            .bind(&new_user.profile_pic_url)
            .bind(&new_user.bio)
            .bind(&new_user.facebook)
            .bind(&new_user.twitter)
            .bind(&new_user.youtube)
            .bind(&new_user.instagram)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE reset_token_hash = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let columns = prefixed_user_columns();
        let sql = format!(
            "SELECT {columns} FROM users u \
             JOIN UNNEST($1::uuid[]) WITH ORDINALITY AS ids(id, ord) ON ids.id = u.id \
             ORDER BY ids.ord"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn search_by_name(&self, query: &str, exclude: Uuid, limit: i64) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE name ILIKE '%' || $1 || '%' AND id <> $2 \
             ORDER BY name LIMIT $3"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(escape_like(query))
            .bind(exclude)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET bio = $2, facebook = $3, twitter = $4, youtube = $5, instagram = $6, \
             profile_pic_url = COALESCE($7, profile_pic_url), updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&update.bio)
            .bind(&update.facebook)
            .bind(&update.twitter)
            .bind(&update.youtube)
            .bind(&update.instagram)
            .bind(&update.profile_pic_url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET password_hash = $2, reset_token_hash = NULL, \
             reset_token_expires_at = NULL, updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE users SET reset_token_hash = $2, reset_token_expires_at = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_unread_notification(&self, id: Uuid, unread: bool) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET unread_notification = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(unread)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

/// `USER_COLUMNS` qualified with the `u` alias for joins
pub(crate) fn prefixed_user_columns() -> String {
    USER_COLUMNS
        .split(',')
        .map(|c| format!("u.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escape LIKE wildcards so user input only matches literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_user_columns() {
        let columns = prefixed_user_columns();
        assert!(columns.starts_with("u.id, u.name"));
        assert!(columns.ends_with("u.updated_at"));
        assert!(!columns.contains("u. "));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("jane"), "jane");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}
