#![allow(dead_code)]
//! Shared helpers for the HTTP integration tests: an in-memory app, a mailer
//! that records what it sent, and shortcuts for registering users.
use std::sync::{Arc, Mutex};

use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};

use social_api::db::Repositories;
use social_api::middleware::SESSION_COOKIE;
use social_api::routes;
use social_api::security::JwtKeys;
use social_api::services::{Mailer, NoopMediaStore, OutgoingEmail};
use social_api::{AppSettings, AppState};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";
pub const TEST_PASSWORD: &str = "secret123";

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn last(&self) -> Option<OutgoingEmail> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> social_api::Result<()> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub fn test_state(mailer: Arc<RecordingMailer>) -> AppState {
    AppState::new(
        Repositories::in_memory(),
        mailer,
        Arc::new(NoopMediaStore),
        Arc::new(JwtKeys::new(TEST_JWT_SECRET, 3600)),
        AppSettings::default(),
    )
}

pub async fn init_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    let jwt = state.jwt.clone();
    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(move |cfg| routes::configure_routes(cfg, jwt)),
    )
    .await
}

pub fn session_cookie(resp: &ServiceResponse) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .expect("response should set the session cookie")
}

/// A registered user as seen by the tests
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub cookie: Cookie<'static>,
}

pub async fn register<S>(app: &S, name: &str, username: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let email = format!("{}@example.com", username);
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "name": name,
            "email": email,
            "username": username,
            "password": TEST_PASSWORD,
        }))
        .to_request();

    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", username);

    let cookie = session_cookie(&resp);
    let body: Value = test::read_body_json(resp).await;

    TestUser {
        id: body["user"]["id"].as_str().unwrap().to_string(),
        username: username.to_string(),
        email,
        cookie,
    }
}

pub async fn get_json<S>(app: &S, user: &TestUser, uri: &str) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::get()
        .uri(uri)
        .cookie(user.cookie.clone())
        .to_request();
    send(app, req).await
}

pub async fn patch_json<S>(app: &S, user: &TestUser, uri: &str, body: Value) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::patch()
        .uri(uri)
        .cookie(user.cookie.clone())
        .set_json(body)
        .to_request();
    send(app, req).await
}

pub async fn post_json<S>(app: &S, user: &TestUser, uri: &str, body: Value) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .cookie(user.cookie.clone())
        .set_json(body)
        .to_request();
    send(app, req).await
}

pub async fn delete<S>(app: &S, user: &TestUser, uri: &str) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::delete()
        .uri(uri)
        .cookie(user.cookie.clone())
        .to_request();
    send(app, req).await
}

async fn send<S>(app: &S, req: Request) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status().as_u16();
    let body = test::read_body(resp).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("response body should be JSON")
    };
    (status, json)
}
