use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::db::{CommentRepository, LikeRepository, PostRepository, SocialRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{
    Comment, CommentDetails, NewNotification, NewPost, NotificationFilter, NotificationType, Post,
    PostDetails, User,
};
use crate::services::media_store::MediaStore;
use crate::services::notification_service::NotificationService;

/// Posts per feed page
pub const FEED_PAGE_SIZE: i64 = 8;

/// Post content as submitted by the author
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub text: String,
    pub location: Option<String>,
    pub pic_url: Option<String>,
}

pub struct PostService {
    posts: Arc<dyn PostRepository>,
    likes: Arc<dyn LikeRepository>,
    comments: Arc<dyn CommentRepository>,
    users: Arc<dyn UserRepository>,
    social: Arc<dyn SocialRepository>,
    notifications: Arc<NotificationService>,
    media: Arc<dyn MediaStore>,
}

impl PostService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        posts: Arc<dyn PostRepository>,
        likes: Arc<dyn LikeRepository>,
        comments: Arc<dyn CommentRepository>,
        users: Arc<dyn UserRepository>,
        social: Arc<dyn SocialRepository>,
        notifications: Arc<NotificationService>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            posts,
            likes,
            comments,
            users,
            social,
            notifications,
            media,
        }
    }

    /// Own posts plus posts of followed users, newest first. Pages start at 1.
    pub async fn feed(&self, user_id: Uuid, page: i64) -> Result<Vec<PostDetails>> {
        let offset = page.max(1).saturating_sub(1).saturating_mul(FEED_PAGE_SIZE);
        let mut authors = self.social.following_ids(user_id).await?;
        authors.push(user_id);

        let posts = self
            .posts
            .posts_by_authors(&authors, FEED_PAGE_SIZE, offset)
            .await?;
        self.details_for(posts).await
    }

    pub async fn create_post(&self, user_id: Uuid, draft: PostDraft) -> Result<PostDetails> {
        let text = draft.text.trim();
        if text.is_empty() {
            return Err(AppError::BadRequest("Post text must not be empty".to_string()));
        }

        let post = self
            .posts
            .create_post(NewPost {
                user_id,
                text: text.to_string(),
                location: draft.location.filter(|l| !l.trim().is_empty()),
                pic_url: draft.pic_url.filter(|u| !u.trim().is_empty()),
            })
            .await?;

        tracing::info!(post_id = %post.id, user_id = %user_id, "Post created");
        self.details(post).await
    }

    pub async fn find(&self, post_id: Uuid) -> Result<PostDetails> {
        let post = self.get_post(post_id).await?;
        self.details(post).await
    }

    pub async fn posts_of(&self, username: &str) -> Result<Vec<PostDetails>> {
        let user = self
            .users
            .find_by_username(&username.trim().to_lowercase())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let posts = self.posts.posts_by_author(user.id).await?;
        self.details_for(posts).await
    }

    pub async fn comment(&self, post_id: Uuid, user_id: Uuid, text: &str) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::BadRequest("Comment text must not be empty".to_string()));
        }

        let post = self.get_post(post_id).await?;
        let comment = self.comments.create_comment(post_id, user_id, text).await?;

        if post.user_id != user_id {
            self.notifications
                .notify(NewNotification::new_comment(
                    post.user_id,
                    user_id,
                    post_id,
                    comment.id,
                    text,
                ))
                .await?;
        }

        tracing::debug!(post_id = %post_id, comment_id = %comment.id, "Comment added");
        Ok(comment)
    }

    pub async fn delete_comment(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<PostDetails> {
        let post = self.get_post(post_id).await?;

        let comment = self
            .comments
            .find_comment(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        if comment.user_id != user_id {
            return Err(AppError::Authorization(
                "Comment does not belong to this user".to_string(),
            ));
        }

        self.comments.delete_comment(comment_id).await?;
        self.notifications
            .retract(NotificationFilter {
                notification_type: NotificationType::NewComment,
                actor_id: user_id,
                recipient_id: None,
                post_id: Some(post_id),
                comment_id: Some(comment_id),
            })
            .await?;

        self.details(post).await
    }

    pub async fn like(&self, post_id: Uuid, user_id: Uuid) -> Result<PostDetails> {
        let post = self.get_post(post_id).await?;
        let liker = self.get_user(user_id).await?;

        if !self.likes.add_like(post_id, user_id).await? {
            return Err(AppError::BadRequest(
                "Post already liked by the user".to_string(),
            ));
        }

        if post.user_id != user_id {
            self.notifications
                .notify(NewNotification::new_like(post.user_id, user_id, post_id))
                .await?;
            self.notifications
                .push_new_like(post.user_id, &liker, post_id)
                .await;
        }

        self.details(post).await
    }

    pub async fn unlike(&self, post_id: Uuid, user_id: Uuid) -> Result<PostDetails> {
        let post = self.get_post(post_id).await?;

        if !self.likes.remove_like(post_id, user_id).await? {
            return Err(AppError::BadRequest(
                "User has not liked this post".to_string(),
            ));
        }

        if post.user_id != user_id {
            self.notifications
                .retract(NotificationFilter {
                    notification_type: NotificationType::NewLike,
                    actor_id: user_id,
                    recipient_id: Some(post.user_id),
                    post_id: Some(post_id),
                    comment_id: None,
                })
                .await?;
        }

        self.details(post).await
    }

    pub async fn likes(&self, post_id: Uuid) -> Result<Vec<User>> {
        self.get_post(post_id).await?;
        self.likes.likers(post_id).await
    }

    /// Only the author may delete. Likes, comments and their notifications go with it.
    pub async fn delete_post(&self, post_id: Uuid, user_id: Uuid) -> Result<Post> {
        let post = self.get_post(post_id).await?;
        if post.user_id != user_id {
            return Err(AppError::Authorization(
                "You are not the author of this post".to_string(),
            ));
        }

        self.posts.delete_post(post_id).await?;

        if let Some(pic_url) = &post.pic_url {
            if let Err(e) = self.media.delete_by_url(pic_url).await {
                tracing::warn!(post_id = %post_id, error = %e, "Failed to delete post image");
            }
        }

        tracing::info!(post_id = %post_id, user_id = %user_id, "Post deleted");
        Ok(post)
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Post> {
        self.posts
            .find_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))
    }

    async fn get_user(&self, user_id: Uuid) -> Result<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn details_for(&self, posts: Vec<Post>) -> Result<Vec<PostDetails>> {
        let mut details = Vec::with_capacity(posts.len());
        for post in posts {
            details.push(self.details(post).await?);
        }
        Ok(details)
    }

    async fn details(&self, post: Post) -> Result<PostDetails> {
        let author = self.get_user(post.user_id).await?;
        let likes = self.likes.likers(post.id).await?;
        let comments = self.comments.comments_for_post(post.id).await?;

        let mut commenter_ids: Vec<Uuid> = comments.iter().map(|c| c.user_id).collect();
        commenter_ids.sort();
        commenter_ids.dedup();
        let commenters: HashMap<Uuid, User> = self
            .users
            .find_many(&commenter_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let comments = comments
            .into_iter()
            .filter_map(|c| {
                let user = commenters.get(&c.user_id)?.clone();
                Some(CommentDetails {
                    id: c.id,
                    text: c.text,
                    date: c.created_at,
                    user,
                })
            })
            .collect();

        Ok(PostDetails {
            id: post.id,
            text: post.text,
            location: post.location,
            pic_url: post.pic_url,
            user: author,
            likes,
            comments,
            created_at: post.created_at,
            updated_at: post.updated_at,
        })
    }
}
