use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewPost, Post};

const POST_COLUMNS: &str = "id, user_id, text, location, pic_url, created_at, updated_at";

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, new_post: NewPost) -> Result<Post>;

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>>;

    /// Posts by any of `author_ids`, newest first
    async fn posts_by_authors(
        &self,
        author_ids: &[Uuid],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>>;

    /// All posts by one author, newest first
    async fn posts_by_author(&self, author_id: Uuid) -> Result<Vec<Post>>;

    /// Delete a post together with its likes, comments and notifications
    async fn delete_post(&self, id: Uuid) -> Result<bool>;
}

pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let sql = format!(
            "INSERT INTO posts (id, user_id, text, location, pic_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {POST_COLUMNS}"
        );
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(Uuid::new_v4())
            .bind(new_post.user_id)
            .bind(&new_post.text)
            .bind(&new_post.location)
            .bind(&new_post.pic_url)
            .fetch_one(&self.pool)
            .await?;
        Ok(post)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn posts_by_authors(
        &self,
        author_ids: &[Uuid],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE user_id = ANY($1) \
             ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(author_ids)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn posts_by_author(&self, author_id: Uuid) -> Result<Vec<Post>> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let posts = sqlx::query_as::<_, Post>(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        // likes, comments and notifications go with the post via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(post_id = %id, deleted = result.rows_affected(), "Post deleted");
        Ok(result.rows_affected() > 0)
    }
}
