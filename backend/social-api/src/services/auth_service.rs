/// Registration, credential checks, session cookies and password resets
use std::sync::Arc;

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use chrono::{Duration, Utc};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::SESSION_COOKIE;
use crate::models::{NewUser, User};
use crate::security::{hash_password, reset_token, verify_password, JwtKeys};
use crate::services::email_service::{password_reset_email, Mailer};

const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Already-validated registration input
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub profile_pic_url: Option<String>,
    pub bio: String,
    pub facebook: String,
    pub twitter: String,
    pub youtube: String,
    pub instagram: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    jwt: Arc<JwtKeys>,
    default_profile_pic_url: String,
    frontend_url: String,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        jwt: Arc<JwtKeys>,
        default_profile_pic_url: impl Into<String>,
        frontend_url: impl Into<String>,
        secure_cookies: bool,
    ) -> Self {
        Self {
            users,
            mailer,
            jwt,
            default_profile_pic_url: default_profile_pic_url.into(),
            frontend_url: frontend_url.into(),
            secure_cookies,
        }
    }

    pub async fn register(&self, registration: Registration) -> Result<User> {
        let email = normalize(&registration.email);
        let username = normalize(&registration.username);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict(
                "User with this username already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&registration.password)?;
        let profile_pic_url = registration
            .profile_pic_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.default_profile_pic_url.clone());

        let user = self
            .users
            .create_user(NewUser {
                name: registration.name.trim().to_string(),
                email,
                username,
                password_hash,
                profile_pic_url: Some(profile_pic_url),
                bio: registration.bio,
                facebook: registration.facebook,
                twitter: registration.twitter,
                youtube: registration.youtube,
                instagram: registration.instagram,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let user = self
            .users
            .find_by_email(&normalize(email))
            .await?
            .ok_or_else(|| {
                AppError::BadRequest("User with that email has not been found".to_string())
            })?;

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::BadRequest("Invalid credentials provided".to_string()));
        }

        Ok(user)
    }

    pub async fn is_username_taken(&self, username: &str) -> Result<bool> {
        Ok(self
            .users
            .find_by_username(&normalize(username))
            .await?
            .is_some())
    }

    /// `Authorization=<jwt>; HttpOnly; Path=/; Max-Age=<ttl>`
    pub fn session_cookie(&self, user: &User) -> Result<Cookie<'static>> {
        let token = self.jwt.issue(user.id)?;
        Ok(Cookie::build(SESSION_COOKIE, token)
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .max_age(CookieDuration::seconds(self.jwt.ttl_seconds()))
            .finish())
    }

    /// Expires the session cookie immediately
    pub fn logout_cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, "")
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .max_age(CookieDuration::ZERO)
            .finish()
    }

    /// Store a fresh reset token and mail the link to the user
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let user = self
            .users
            .find_by_email(&normalize(email))
            .await?
            .ok_or_else(|| AppError::NotFound("User with that email does not exist".to_string()))?;

        let token = reset_token::generate_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        self.users
            .set_reset_token(user.id, &reset_token::hash_token(&token), expires_at)
            .await?;

        let reset_url = format!("{}/reset/{}", self.frontend_url.trim_end_matches('/'), token);
        let first_name = user.name.split_whitespace().next().unwrap_or(&user.name);
        self.mailer
            .send(password_reset_email(&user.email, first_name, &reset_url))
            .await?;

        tracing::info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<User> {
        let user = self
            .users
            .find_by_reset_token(&reset_token::hash_token(token))
            .await?
            .ok_or_else(|| AppError::InvalidToken("Token not found".to_string()))?;

        let expires_at = user
            .reset_token_expires_at
            .ok_or_else(|| AppError::InvalidToken("Token not found".to_string()))?;
        if Utc::now() > expires_at {
            return Err(AppError::InvalidToken("Token has expired".to_string()));
        }

        let password_hash = hash_password(new_password)?;
        let user = self
            .users
            .update_password(user.id, &password_hash)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(user)
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
