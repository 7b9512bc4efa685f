/// End-to-end flows over the HTTP surface: follows, posts, likes, comments
/// and the notifications they leave behind. Runs against the in-memory store.
mod common;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::test;
    use serde_json::json;

    use crate::common::fixtures::{self, RecordingMailer};

    // ============================================
    // Follow graph
    // ============================================

    #[actix_web::test]
    async fn test_follow_creates_and_unfollow_retracts_notification() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice Liddell", "alice").await;
        let bob = fixtures::register(&app, "Bob Builder", "bob").await;

        let (status, me) =
            fixtures::patch_json(&app, &alice, &format!("/user/follow/{}", bob.id), json!({})).await;
        assert_eq!(status, 200);
        assert_eq!(me["username"], "alice");

        let (status, notifications) = fixtures::get_json(&app, &bob, "/notifications").await;
        assert_eq!(status, 200);
        let notifications = notifications.as_array().unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0]["type"], "newFollower");
        assert_eq!(notifications[0]["user"]["username"], "alice");

        let (_, current) = fixtures::get_json(&app, &bob, "/auth").await;
        assert_eq!(current["user"]["unreadNotification"], true);

        let (status, body) =
            fixtures::patch_json(&app, &alice, &format!("/user/follow/{}", bob.id), json!({})).await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "User already followed");

        let (status, _) =
            fixtures::patch_json(&app, &alice, &format!("/user/unfollow/{}", bob.id), json!({}))
                .await;
        assert_eq!(status, 200);

        let (_, notifications) = fixtures::get_json(&app, &bob, "/notifications").await;
        assert!(notifications.as_array().unwrap().is_empty());

        let (status, body) =
            fixtures::patch_json(&app, &alice, &format!("/user/unfollow/{}", bob.id), json!({}))
                .await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "User already unfollowed");
    }

    #[actix_web::test]
    async fn test_cannot_follow_self_or_unknown_user() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice", "alice").await;

        let (status, body) =
            fixtures::patch_json(&app, &alice, &format!("/user/follow/{}", alice.id), json!({}))
                .await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "You cannot follow yourself");

        let (status, _) = fixtures::patch_json(
            &app,
            &alice,
            &format!("/user/follow/{}", uuid::Uuid::new_v4()),
            json!({}),
        )
        .await;
        assert_eq!(status, 404);

        let (status, _) =
            fixtures::patch_json(&app, &alice, "/user/follow/not-a-uuid", json!({})).await;
        assert_eq!(status, 400);
    }

    #[actix_web::test]
    async fn test_profile_counts_and_follow_lists() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice", "alice").await;
        let bob = fixtures::register(&app, "Bob", "bob").await;
        let carol = fixtures::register(&app, "Carol", "carol").await;

        for follower in [&alice, &carol] {
            let (status, _) = fixtures::patch_json(
                &app,
                follower,
                &format!("/user/follow/{}", bob.id),
                json!({}),
            )
            .await;
            assert_eq!(status, 200);
        }

        let (status, profile) = fixtures::get_json(&app, &alice, "/user/profile/bob").await;
        assert_eq!(status, 200);
        assert_eq!(profile["followersLength"], 2);
        assert_eq!(profile["followingLength"], 0);
        assert_eq!(profile["profile"]["name"], "Bob");

        let (_, followers) =
            fixtures::get_json(&app, &alice, &format!("/user/followers/{}", bob.id)).await;
        let usernames: Vec<&str> = followers
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["username"].as_str().unwrap())
            .collect();
        assert_eq!(usernames, vec!["carol", "alice"]);

        let (_, following) =
            fixtures::get_json(&app, &alice, &format!("/user/following/{}", alice.id)).await;
        assert_eq!(following.as_array().unwrap().len(), 1);
        assert_eq!(following[0]["username"], "bob");

        let (_, current) = fixtures::get_json(&app, &alice, "/auth?getFollowingData=true").await;
        assert_eq!(current["userFollowStats"]["following"][0]["username"], "bob");
        assert!(current["userFollowStats"]["followers"]
            .as_array()
            .unwrap()
            .is_empty());

        let (status, _) = fixtures::get_json(&app, &alice, "/user/profile/nobody").await;
        assert_eq!(status, 404);
    }

    #[actix_web::test]
    async fn test_search_excludes_requester() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice Smith", "alice").await;
        fixtures::register(&app, "Alina Smith", "alina").await;
        fixtures::register(&app, "Bob Jones", "bob").await;

        let (status, results) = fixtures::get_json(&app, &alice, "/user/search/Smith").await;
        assert_eq!(status, 200);
        let results = results.as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["username"], "alina");
    }

    #[actix_web::test]
    async fn test_mark_notifications_read() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice", "alice").await;
        let bob = fixtures::register(&app, "Bob", "bob").await;

        fixtures::patch_json(&app, &alice, &format!("/user/follow/{}", bob.id), json!({})).await;

        let (status, me) = fixtures::patch_json(&app, &bob, "/user/notifications", json!({})).await;
        assert_eq!(status, 200);
        assert_eq!(me["unreadNotification"], false);

        let (_, notifications) = fixtures::get_json(&app, &bob, "/notifications").await;
        assert_eq!(notifications.as_array().unwrap().len(), 1);
    }

    // ============================================
    // Posts, likes and comments
    // ============================================

    #[actix_web::test]
    async fn test_feed_contains_own_and_followed_posts() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice", "alice").await;
        let bob = fixtures::register(&app, "Bob", "bob").await;

        let (status, post) =
            fixtures::post_json(&app, &bob, "/post", json!({ "text": "hello from bob" })).await;
        assert_eq!(status, 201);
        assert_eq!(post["user"]["username"], "bob");

        let (_, feed) = fixtures::get_json(&app, &alice, "/post?page-number=1").await;
        assert!(feed.as_array().unwrap().is_empty());

        fixtures::patch_json(&app, &alice, &format!("/user/follow/{}", bob.id), json!({})).await;
        fixtures::post_json(&app, &alice, "/post", json!({ "text": "alice here" })).await;

        let (status, feed) = fixtures::get_json(&app, &alice, "/post?page-number=1").await;
        assert_eq!(status, 200);
        let texts: Vec<&str> = feed
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["text"].as_str().unwrap())
            .collect();
        assert_eq!(texts, vec!["alice here", "hello from bob"]);

        let (_, second_page) = fixtures::get_json(&app, &alice, "/post?page-number=2").await;
        assert!(second_page.as_array().unwrap().is_empty());

        let uri = format!("/post?page-number={}", i64::MAX);
        let (status, far_page) = fixtures::get_json(&app, &alice, &uri).await;
        assert_eq!(status, 200);
        assert!(far_page.as_array().unwrap().is_empty());

        let (_, by_user) = fixtures::get_json(&app, &alice, "/post/user/bob").await;
        assert_eq!(by_user.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_create_post_rejects_empty_text() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice", "alice").await;

        let (status, _) = fixtures::post_json(&app, &alice, "/post", json!({ "text": "" })).await;
        assert_eq!(status, 400);
    }

    #[actix_web::test]
    async fn test_like_notifies_author_and_unlike_retracts() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice", "alice").await;
        let bob = fixtures::register(&app, "Bob", "bob").await;

        let (_, post) =
            fixtures::post_json(&app, &bob, "/post", json!({ "text": "like me" })).await;
        let post_id = post["id"].as_str().unwrap().to_string();

        let (status, liked) =
            fixtures::patch_json(&app, &alice, &format!("/post/like/{}", post_id), json!({})).await;
        assert_eq!(status, 200);
        assert_eq!(liked["likes"][0]["username"], "alice");

        let (status, body) =
            fixtures::patch_json(&app, &alice, &format!("/post/like/{}", post_id), json!({})).await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "Post already liked by the user");

        let (_, likers) = fixtures::get_json(&app, &bob, &format!("/post/likes/{}", post_id)).await;
        assert_eq!(likers.as_array().unwrap().len(), 1);

        let (_, notifications) = fixtures::get_json(&app, &bob, "/notifications").await;
        assert_eq!(notifications[0]["type"], "newLike");
        assert_eq!(notifications[0]["post"]["id"], post_id.as_str());

        let (status, _) =
            fixtures::patch_json(&app, &alice, &format!("/post/unlike/{}", post_id), json!({}))
                .await;
        assert_eq!(status, 200);

        let (_, notifications) = fixtures::get_json(&app, &bob, "/notifications").await;
        assert!(notifications.as_array().unwrap().is_empty());

        let (status, body) =
            fixtures::patch_json(&app, &alice, &format!("/post/unlike/{}", post_id), json!({}))
                .await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "User has not liked this post");
    }

    #[actix_web::test]
    async fn test_self_like_does_not_notify() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let bob = fixtures::register(&app, "Bob", "bob").await;

        let (_, post) = fixtures::post_json(&app, &bob, "/post", json!({ "text": "mine" })).await;
        let post_id = post["id"].as_str().unwrap();

        let (status, _) =
            fixtures::patch_json(&app, &bob, &format!("/post/like/{}", post_id), json!({})).await;
        assert_eq!(status, 200);

        let (_, notifications) = fixtures::get_json(&app, &bob, "/notifications").await;
        assert!(notifications.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_comment_lifecycle() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice", "alice").await;
        let bob = fixtures::register(&app, "Bob", "bob").await;

        let (_, post) = fixtures::post_json(&app, &bob, "/post", json!({ "text": "discuss" })).await;
        let post_id = post["id"].as_str().unwrap().to_string();

        let (status, comment) = fixtures::post_json(
            &app,
            &alice,
            &format!("/post/comment/{}", post_id),
            json!({ "text": "nice post" }),
        )
        .await;
        assert_eq!(status, 201);
        let comment_id = comment["id"].as_str().unwrap().to_string();

        let (_, notifications) = fixtures::get_json(&app, &bob, "/notifications").await;
        assert_eq!(notifications[0]["type"], "newComment");
        assert_eq!(notifications[0]["text"], "nice post");
        assert_eq!(notifications[0]["commentId"], comment_id.as_str());

        let (_, details) =
            fixtures::get_json(&app, &bob, &format!("/post/single/{}", post_id)).await;
        assert_eq!(details["comments"][0]["user"]["username"], "alice");

        let uri = format!("/post/comment/{}/{}", post_id, comment_id);
        let (status, body) = fixtures::delete(&app, &bob, &uri).await;
        assert_eq!(status, 403);
        assert_eq!(body["message"], "Comment does not belong to this user");

        let (status, details) = fixtures::delete(&app, &alice, &uri).await;
        assert_eq!(status, 200);
        assert!(details["comments"].as_array().unwrap().is_empty());

        let (_, notifications) = fixtures::get_json(&app, &bob, "/notifications").await;
        assert!(notifications.as_array().unwrap().is_empty());

        let (status, _) = fixtures::delete(&app, &alice, &uri).await;
        assert_eq!(status, 404);
    }

    #[actix_web::test]
    async fn test_only_author_deletes_post() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice", "alice").await;
        let bob = fixtures::register(&app, "Bob", "bob").await;

        let (_, post) = fixtures::post_json(&app, &bob, "/post", json!({ "text": "temp" })).await;
        let post_id = post["id"].as_str().unwrap().to_string();
        fixtures::patch_json(&app, &alice, &format!("/post/like/{}", post_id), json!({})).await;

        let (status, body) = fixtures::delete(&app, &alice, &format!("/post/{}", post_id)).await;
        assert_eq!(status, 403);
        assert_eq!(body["message"], "You are not the author of this post");

        let (status, _) = fixtures::delete(&app, &bob, &format!("/post/{}", post_id)).await;
        assert_eq!(status, 200);

        let (status, _) =
            fixtures::get_json(&app, &bob, &format!("/post/single/{}", post_id)).await;
        assert_eq!(status, 404);

        let (_, notifications) = fixtures::get_json(&app, &bob, "/notifications").await;
        assert!(notifications.as_array().unwrap().is_empty());
    }

    // ============================================
    // Access control and plumbing
    // ============================================

    #[actix_web::test]
    async fn test_protected_routes_require_session() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;

        let req = test::TestRequest::get().uri("/notifications").to_request();
        let err = test::try_call_service(&app, req)
            .await
            .err()
            .expect("request without a session should be rejected");
        assert_eq!(err.as_response_error().status_code(), 401);
    }

    #[actix_web::test]
    async fn test_bearer_token_is_accepted() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice", "alice").await;

        let req = test::TestRequest::get()
            .uri("/auth")
            .insert_header(("Authorization", format!("Bearer {}", alice.cookie.value())))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_web::test]
    async fn test_health_reports_storage() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storage"], "memory");
        assert_eq!(body["connectedSockets"], 0);
    }
}
