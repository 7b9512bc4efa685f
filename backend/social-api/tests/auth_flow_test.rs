/// Registration, login, logout and the password reset round trip
mod common;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::test;
    use serde_json::{json, Value};

    use crate::common::fixtures::{self, RecordingMailer, TEST_PASSWORD};

    fn reset_token_from(body: &str) -> String {
        let start = body.find("/reset/").expect("reset link in email") + "/reset/".len();
        body[start..]
            .chars()
            .take_while(|c| c.is_ascii_hexdigit())
            .collect()
    }

    #[actix_web::test]
    async fn test_register_sets_session_cookie() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "name": "Alice",
                "email": "Alice@Example.com",
                "username": "Alice",
                "password": TEST_PASSWORD,
                "bio": "hi",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let cookie = fixtures::session_cookie(&resp);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age().map(|d| d.whole_seconds()), Some(3600));

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["user"]["email"], "alice@example.com");
        assert_eq!(body["user"]["username"], "alice");
        assert_eq!(body["user"]["profilePicUrl"], "https://media.local/defaultpfp.jpeg");
        assert!(body["user"].get("passwordHash").is_none());
    }

    #[actix_web::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        fixtures::register(&app, "Alice", "alice").await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "name": "Other",
                "email": "alice@example.com",
                "username": "other",
                "password": TEST_PASSWORD,
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "name": "Short",
                "email": "short@example.com",
                "username": "short",
                "password": "123",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn test_is_taken() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        fixtures::register(&app, "Alice", "alice").await;

        let req = test::TestRequest::get().uri("/auth/is-taken/alice").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);

        let req = test::TestRequest::get().uri("/auth/is-taken/zoe").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["available"], true);
    }

    #[actix_web::test]
    async fn test_login_and_logout() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice", "alice").await;

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": alice.email, "password": "wrong-password" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Invalid credentials provided");

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": alice.email, "password": TEST_PASSWORD }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let cookie = fixtures::session_cookie(&resp);

        let req = test::TestRequest::post()
            .uri("/auth/logout")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let cleared = fixtures::session_cookie(&resp);
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age().map(|d| d.whole_seconds()), Some(0));

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "success");
    }

    #[actix_web::test]
    async fn test_password_reset_round_trip() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = fixtures::init_app(fixtures::test_state(mailer.clone())).await;
        let alice = fixtures::register(&app, "Alice Liddell", "alice").await;

        let req = test::TestRequest::post()
            .uri("/auth/reset?email=not-an-email")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        let req = test::TestRequest::post()
            .uri("/auth/reset?email=ghost@example.com")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);

        let req = test::TestRequest::post()
            .uri(&format!("/auth/reset?email={}", alice.email))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let email = mailer.last().expect("reset email sent");
        assert_eq!(email.to, alice.email);
        assert!(email.text_body.contains("Hi Alice,"));
        let token = reset_token_from(&email.text_body);
        assert_eq!(token.len(), 64);

        let req = test::TestRequest::post()
            .uri("/auth/reset/token")
            .set_json(json!({ "token": token, "password": "brand-new-pass" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "email": alice.email, "password": "brand-new-pass" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        // The token is single use
        let req = test::TestRequest::post()
            .uri("/auth/reset/token")
            .set_json(json!({ "token": token, "password": "another-pass" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 498);
    }

    #[actix_web::test]
    async fn test_update_password_requires_current_password() {
        let app = fixtures::init_app(fixtures::test_state(Arc::new(RecordingMailer::default()))).await;
        let alice = fixtures::register(&app, "Alice", "alice").await;

        let (status, body) = fixtures::patch_json(
            &app,
            &alice,
            "/user/settings/update-password",
            json!({ "currentPassword": "nope", "newPassword": "changed-pass" }),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["message"], "Incorrect current password");

        let (status, _) = fixtures::patch_json(
            &app,
            &alice,
            "/user/settings/update-password",
            json!({ "currentPassword": TEST_PASSWORD, "newPassword": "changed-pass" }),
        )
        .await;
        assert_eq!(status, 200);
    }
}
