//! Application state shared by all handlers

use std::sync::Arc;

use crate::config::{Config, StorageBackend};
use crate::db::Repositories;
use crate::security::JwtKeys;
use crate::services::{
    AuthService, Mailer, MediaStore, NotificationService, PostService, UserService,
};
use crate::websocket::SocketRegistry;

/// Settings the services need beyond their collaborators
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub storage: StorageBackend,
    pub default_profile_pic_url: String,
    pub frontend_url: String,
    pub secure_cookies: bool,
}

impl From<&Config> for AppSettings {
    fn from(config: &Config) -> Self {
        Self {
            storage: config.app.storage,
            default_profile_pic_url: config.media.default_profile_pic_url.clone(),
            frontend_url: config.app.frontend_url.clone(),
            secure_cookies: config.is_production(),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Memory,
            default_profile_pic_url: "https://media.local/defaultpfp.jpeg".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            secure_cookies: false,
        }
    }
}

/// Everything the handlers reach through `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub notifications: Arc<NotificationService>,
    pub registry: SocketRegistry,
    pub jwt: Arc<JwtKeys>,
    pub storage: StorageBackend,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        mailer: Arc<dyn Mailer>,
        media: Arc<dyn MediaStore>,
        jwt: Arc<JwtKeys>,
        settings: AppSettings,
    ) -> Self {
        let registry = SocketRegistry::new();

        let notifications = Arc::new(NotificationService::new(
            repos.notifications.clone(),
            repos.users.clone(),
            repos.posts.clone(),
            registry.clone(),
        ));

        let auth = Arc::new(AuthService::new(
            repos.users.clone(),
            mailer,
            jwt.clone(),
            settings.default_profile_pic_url.clone(),
            settings.frontend_url,
            settings.secure_cookies,
        ));

        let users = Arc::new(UserService::new(
            repos.users.clone(),
            repos.social.clone(),
            notifications.clone(),
            media.clone(),
            settings.default_profile_pic_url,
        ));

        let posts = Arc::new(PostService::new(
            repos.posts,
            repos.likes,
            repos.comments,
            repos.users,
            repos.social,
            notifications.clone(),
            media,
        ));

        Self {
            auth,
            users,
            posts,
            notifications,
            registry,
            jwt,
            storage: settings.storage,
        }
    }
}
