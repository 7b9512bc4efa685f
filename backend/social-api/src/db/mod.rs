use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;

pub mod comment_repo;
pub mod like_repo;
pub mod memory;
pub mod notification_repo;
pub mod post_repo;
pub mod social_repo;
pub mod user_repo;

pub use comment_repo::{CommentRepository, PgCommentRepository};
pub use like_repo::{LikeRepository, PgLikeRepository};
pub use memory::MemoryStore;
pub use notification_repo::{NotificationRepository, PgNotificationRepository};
pub use post_repo::{PgPostRepository, PostRepository};
pub use social_repo::{PgSocialRepository, SocialRepository};
pub use user_repo::{PgUserRepository, UserRepository};

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../migrations").run(pool).await
}

/// One handle per repository trait, shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub social: Arc<dyn SocialRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            social: Arc::new(PgSocialRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            likes: Arc::new(PgLikeRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            notifications: Arc::new(PgNotificationRepository::new(pool)),
        }
    }

    /// Every repository backed by the same in-process store
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            social: store.clone(),
            posts: store.clone(),
            likes: store.clone(),
            comments: store.clone(),
            notifications: store,
        }
    }
}
