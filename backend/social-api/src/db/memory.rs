//! In-process storage backend (`APP_STORAGE=memory`).
//!
//! Implements every repository trait over a single lock-protected state so
//! cascades stay consistent. Collections keep insertion order, so "newest
//! first" reads simply iterate in reverse.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::comment_repo::CommentRepository;
use crate::db::like_repo::LikeRepository;
use crate::db::notification_repo::NotificationRepository;
use crate::db::post_repo::PostRepository;
use crate::db::social_repo::SocialRepository;
use crate::db::user_repo::UserRepository;
use crate::error::{AppError, Result};
use crate::models::{
    Comment, FollowCounts, NewNotification, NewPost, NewUser, Notification, NotificationFilter,
    Post, ProfileUpdate, User, UserRole,
};

#[derive(Debug, Clone, Copy)]
struct Edge {
    from: Uuid,
    to: Uuid,
}

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    follows: Vec<Edge>,
    posts: Vec<Post>,
    likes: Vec<Edge>,
    comments: Vec<Comment>,
    notifications: Vec<Notification>,
}

impl State {
    fn users_in_order(&self, ids: impl Iterator<Item = Uuid>) -> Vec<User> {
        ids.filter_map(|id| self.users.get(&id).cloned()).collect()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut state = self.state.write().await;

        if state
            .users
            .values()
            .any(|u| u.email == new_user.email || u.username == new_user.username)
        {
            return Err(AppError::Conflict(
                "User with this email or username already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            username: new_user.username,
            password_hash: new_user.password_hash,
            profile_pic_url: new_user.profile_pic_url,
            unread_notification: false,
            role: UserRole::User,
            reset_token_hash: None,
            reset_token_expires_at: None,
            bio: new_user.bio,
            facebook: new_user.facebook,
            twitter: new_user.twitter,
            youtube: new_user.youtube,
            instagram: new_user.instagram,
            created_at: now,
            updated_at: now,
        };

        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.reset_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<User>> {
        let state = self.state.read().await;
        Ok(state.users_in_order(ids.iter().copied()))
    }

    async fn search_by_name(&self, query: &str, exclude: Uuid, limit: i64) -> Result<Vec<User>> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;

        let mut matches: Vec<User> = state
            .users
            .values()
            .filter(|u| u.id != exclude && u.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches.truncate(limit.max(0) as usize);
        Ok(matches)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };

        user.bio = update.bio;
        user.facebook = update.facebook;
        user.twitter = update.twitter;
        user.youtube = update.youtube;
        user.instagram = update.instagram;
        if let Some(url) = update.profile_pic_url {
            user.profile_pic_url = Some(url);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };

        user.password_hash = password_hash.to_string();
        user.reset_token_hash = None;
        user.reset_token_expires_at = None;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(user) = state.users.get_mut(&id) {
            user.reset_token_hash = Some(token_hash.to_string());
            user.reset_token_expires_at = Some(expires_at);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_unread_notification(&self, id: Uuid, unread: bool) -> Result<Option<User>> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };

        user.unread_notification = unread;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl SocialRepository for MemoryStore {
    async fn add_follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        if follower_id == followed_id {
            return Err(AppError::BadRequest("You cannot follow yourself".to_string()));
        }

        let mut state = self.state.write().await;
        if state
            .follows
            .iter()
            .any(|e| e.from == follower_id && e.to == followed_id)
        {
            return Ok(false);
        }

        state.follows.push(Edge {
            from: follower_id,
            to: followed_id,
        });
        Ok(true)
    }

    async fn remove_follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.follows.len();
        state
            .follows
            .retain(|e| !(e.from == follower_id && e.to == followed_id));
        Ok(state.follows.len() < before)
    }

    async fn followers_of(&self, user_id: Uuid) -> Result<Vec<User>> {
        let state = self.state.read().await;
        let ids = state
            .follows
            .iter()
            .rev()
            .filter(|e| e.to == user_id)
            .map(|e| e.from);
        Ok(state.users_in_order(ids))
    }

    async fn following_of(&self, user_id: Uuid) -> Result<Vec<User>> {
        let state = self.state.read().await;
        let ids = state
            .follows
            .iter()
            .rev()
            .filter(|e| e.from == user_id)
            .map(|e| e.to);
        Ok(state.users_in_order(ids))
    }

    async fn following_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .filter(|e| e.from == user_id)
            .map(|e| e.to)
            .collect())
    }

    async fn follow_counts(&self, user_id: Uuid) -> Result<FollowCounts> {
        let state = self.state.read().await;
        let followers = state.follows.iter().filter(|e| e.to == user_id).count();
        let following = state.follows.iter().filter(|e| e.from == user_id).count();
        Ok(FollowCounts {
            followers: followers as i64,
            following: following as i64,
        })
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: new_post.user_id,
            text: new_post.text,
            location: new_post.location,
            pic_url: new_post.pic_url,
            created_at: now,
            updated_at: now,
        };

        self.state.write().await.posts.push(post.clone());
        Ok(post)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        let state = self.state.read().await;
        Ok(state.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn posts_by_authors(
        &self,
        author_ids: &[Uuid],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Post>> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .rev()
            .filter(|p| author_ids.contains(&p.user_id))
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn posts_by_author(&self, author_id: Uuid) -> Result<Vec<Post>> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .rev()
            .filter(|p| p.user_id == author_id)
            .cloned()
            .collect())
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        if state.posts.len() == before {
            return Ok(false);
        }

        state.likes.retain(|e| e.from != id);
        state.comments.retain(|c| c.post_id != id);
        state.notifications.retain(|n| n.post_id != Some(id));
        Ok(true)
    }
}

#[async_trait]
impl LikeRepository for MemoryStore {
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if state
            .likes
            .iter()
            .any(|e| e.from == post_id && e.to == user_id)
        {
            return Ok(false);
        }

        state.likes.push(Edge {
            from: post_id,
            to: user_id,
        });
        Ok(true)
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.likes.len();
        state
            .likes
            .retain(|e| !(e.from == post_id && e.to == user_id));
        Ok(state.likes.len() < before)
    }

    async fn likers(&self, post_id: Uuid) -> Result<Vec<User>> {
        let state = self.state.read().await;
        let ids = state
            .likes
            .iter()
            .rev()
            .filter(|e| e.from == post_id)
            .map(|e| e.to);
        Ok(state.users_in_order(ids))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, post_id: Uuid, user_id: Uuid, text: &str) -> Result<Comment> {
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            text: text.to_string(),
            created_at: Utc::now(),
        };

        self.state.write().await.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        let state = self.state.read().await;
        Ok(state.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn comments_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let state = self.state.read().await;
        Ok(state
            .comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state.comments.retain(|c| c.id != id);
        if state.comments.len() == before {
            return Ok(false);
        }

        state.notifications.retain(|n| n.comment_id != Some(id));
        Ok(true)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn create_notification(&self, notification: NewNotification) -> Result<Notification> {
        let created = Notification {
            id: Uuid::new_v4(),
            notification_type: notification.notification_type,
            recipient_id: notification.recipient_id,
            actor_id: notification.actor_id,
            post_id: notification.post_id,
            comment_id: notification.comment_id,
            text: notification.text,
            created_at: Utc::now(),
        };

        self.state.write().await.notifications.push(created.clone());
        Ok(created)
    }

    async fn delete_matching(&self, filter: &NotificationFilter) -> Result<u64> {
        let mut state = self.state.write().await;
        let before = state.notifications.len();
        state.notifications.retain(|n| !filter.matches(n));
        Ok((before - state.notifications.len()) as u64)
    }

    async fn list_for_recipient(&self, recipient_id: Uuid) -> Result<Vec<Notification>> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            name: username.to_string(),
            email: format!("{username}@example.com"),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            profile_pic_url: None,
            bio: String::new(),
            facebook: String::new(),
            twitter: String::new(),
            youtube: String::new(),
            instagram: String::new(),
        }
    }

    fn new_post(user_id: Uuid, text: &str) -> NewPost {
        NewPost {
            user_id,
            text: text.to_string(),
            location: None,
            pic_url: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let store = MemoryStore::new();
        store.create_user(new_user("alice")).await.unwrap();

        let mut dup = new_user("alice");
        dup.email = "other@example.com".to_string();
        let err = store.create_user(dup).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_follow_edges_are_unique() {
        let store = MemoryStore::new();
        let a = store.create_user(new_user("alice")).await.unwrap();
        let b = store.create_user(new_user("bob")).await.unwrap();

        assert!(store.add_follow(a.id, b.id).await.unwrap());
        assert!(!store.add_follow(a.id, b.id).await.unwrap());
        assert!(store.add_follow(a.id, a.id).await.is_err());

        let counts = store.follow_counts(b.id).await.unwrap();
        assert_eq!(counts, FollowCounts { followers: 1, following: 0 });

        assert!(store.remove_follow(a.id, b.id).await.unwrap());
        assert!(!store.remove_follow(a.id, b.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_posts_newest_first_with_paging() {
        let store = MemoryStore::new();
        let a = store.create_user(new_user("alice")).await.unwrap();
        for i in 0..5 {
            store.create_post(new_post(a.id, &format!("post {i}"))).await.unwrap();
        }

        let page = store.posts_by_authors(&[a.id], 2, 0).await.unwrap();
        assert_eq!(page[0].text, "post 4");
        assert_eq!(page[1].text, "post 3");

        let last = store.posts_by_authors(&[a.id], 2, 4).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].text, "post 0");
    }

    #[tokio::test]
    async fn test_delete_post_cascades() {
        let store = MemoryStore::new();
        let a = store.create_user(new_user("alice")).await.unwrap();
        let b = store.create_user(new_user("bob")).await.unwrap();
        let post = store.create_post(new_post(a.id, "hello")).await.unwrap();

        store.add_like(post.id, b.id).await.unwrap();
        let comment = store.create_comment(post.id, b.id, "nice").await.unwrap();
        store
            .create_notification(NewNotification::new_comment(
                a.id, b.id, post.id, comment.id, "nice",
            ))
            .await
            .unwrap();

        assert!(store.delete_post(post.id).await.unwrap());
        assert!(store.likers(post.id).await.unwrap().is_empty());
        assert!(store.find_comment(comment.id).await.unwrap().is_none());
        assert!(store.list_for_recipient(a.id).await.unwrap().is_empty());
        assert!(!store.delete_post(post.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_matching_respects_filter() {
        let store = MemoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let post_1 = Uuid::new_v4();
        let post_2 = Uuid::new_v4();

        store
            .create_notification(NewNotification::new_like(a, b, post_1))
            .await
            .unwrap();
        store
            .create_notification(NewNotification::new_like(a, b, post_2))
            .await
            .unwrap();

        let removed = store
            .delete_matching(&NotificationFilter {
                notification_type: NotificationType::NewLike,
                actor_id: b,
                recipient_id: Some(a),
                post_id: Some(post_1),
                comment_id: None,
            })
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let remaining = store.list_for_recipient(a).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].post_id, Some(post_2));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_excludes_requester() {
        let store = MemoryStore::new();
        let mut jane = new_user("jane");
        jane.name = "Jane Doe".to_string();
        let jane = store.create_user(jane).await.unwrap();
        let mut john = new_user("john");
        john.name = "John Doe".to_string();
        store.create_user(john).await.unwrap();

        let found = store.search_by_name("doe", jane.id, 8).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "john");
    }
}
