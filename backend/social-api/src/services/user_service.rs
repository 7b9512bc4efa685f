use std::sync::Arc;

use uuid::Uuid;

use crate::db::{SocialRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{
    FollowStats, NewNotification, NotificationFilter, NotificationType, Profile, ProfileUpdate,
    PublicProfile, User,
};
use crate::security::{hash_password, verify_password};
use crate::services::media_store::MediaStore;
use crate::services::notification_service::NotificationService;

/// Maximum number of users returned by a name search
pub const SEARCH_LIMIT: i64 = 8;

pub struct UserService {
    users: Arc<dyn UserRepository>,
    social: Arc<dyn SocialRepository>,
    notifications: Arc<NotificationService>,
    media: Arc<dyn MediaStore>,
    default_profile_pic_url: String,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        social: Arc<dyn SocialRepository>,
        notifications: Arc<NotificationService>,
        media: Arc<dyn MediaStore>,
        default_profile_pic_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            social,
            notifications,
            media,
            default_profile_pic_url: default_profile_pic_url.into(),
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User> {
        self.users
            .find_by_username(&username.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn profile(&self, username: &str) -> Result<Profile> {
        let user = self.find_by_username(username).await?;
        let counts = self.social.follow_counts(user.id).await?;

        Ok(Profile {
            profile: PublicProfile::from(&user),
            followers_length: counts.followers,
            following_length: counts.following,
        })
    }

    pub async fn search(&self, query: &str, requester: Uuid) -> Result<Vec<User>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.users.search_by_name(query, requester, SEARCH_LIMIT).await
    }

    /// Replacing the picture removes the previous upload from the media store
    pub async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User> {
        let current = self.find_by_id(id).await?;
        let new_pic = update.profile_pic_url.clone();

        let updated = self
            .users
            .update_profile(id, update)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let (Some(new_pic), Some(old_pic)) = (new_pic, current.profile_pic_url) {
            if new_pic != old_pic && old_pic != self.default_profile_pic_url {
                if let Err(e) = self.media.delete_by_url(&old_pic).await {
                    tracing::warn!(user_id = %id, error = %e, "Failed to delete old profile picture");
                }
            }
        }

        Ok(updated)
    }

    pub async fn follow(&self, user_id: Uuid, target_id: Uuid) -> Result<User> {
        if user_id == target_id {
            return Err(AppError::BadRequest("You cannot follow yourself".to_string()));
        }

        let user = self.find_by_id(user_id).await?;
        self.find_by_id(target_id).await?;

        if !self.social.add_follow(user_id, target_id).await? {
            return Err(AppError::BadRequest("User already followed".to_string()));
        }

        self.notifications
            .notify(NewNotification::new_follower(target_id, user_id))
            .await?;

        tracing::info!(follower_id = %user_id, followed_id = %target_id, "User followed");
        Ok(user)
    }

    pub async fn unfollow(&self, user_id: Uuid, target_id: Uuid) -> Result<User> {
        if user_id == target_id {
            return Err(AppError::BadRequest(
                "You cannot unfollow yourself".to_string(),
            ));
        }

        let user = self.find_by_id(user_id).await?;
        self.find_by_id(target_id).await?;

        if !self.social.remove_follow(user_id, target_id).await? {
            return Err(AppError::BadRequest("User already unfollowed".to_string()));
        }

        self.notifications
            .retract(NotificationFilter {
                notification_type: NotificationType::NewFollower,
                actor_id: user_id,
                recipient_id: Some(target_id),
                post_id: None,
                comment_id: None,
            })
            .await?;

        tracing::info!(follower_id = %user_id, followed_id = %target_id, "User unfollowed");
        Ok(user)
    }

    pub async fn followers(&self, user_id: Uuid) -> Result<Vec<User>> {
        self.find_by_id(user_id).await?;
        self.social.followers_of(user_id).await
    }

    pub async fn following(&self, user_id: Uuid) -> Result<Vec<User>> {
        self.find_by_id(user_id).await?;
        self.social.following_of(user_id).await
    }

    pub async fn following_data(&self, user_id: Uuid) -> Result<FollowStats> {
        self.find_by_id(user_id).await?;
        Ok(FollowStats {
            followers: self.social.followers_of(user_id).await?,
            following: self.social.following_of(user_id).await?,
        })
    }

    pub async fn mark_notifications_read(&self, user_id: Uuid) -> Result<User> {
        self.users
            .set_unread_notification(user_id, false)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<User> {
        let user = self.find_by_id(user_id).await?;
        if !verify_password(current_password, &user.password_hash)? {
            return Err(AppError::BadRequest("Incorrect current password".to_string()));
        }

        let password_hash = hash_password(new_password)?;
        self.users
            .update_password(user_id, &password_hash)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
