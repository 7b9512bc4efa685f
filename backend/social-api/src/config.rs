use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
    pub media: MediaConfig,
}

/// Which repository implementation backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Postgres => "postgres",
            StorageBackend::Memory => "memory",
        }
    }
}

/// `APP_*`
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_env")]
    pub env: String,

    #[serde(default = "default_app_host")]
    pub host: String,

    #[serde(default = "default_app_port")]
    pub port: u16,

    /// Origin allowed by CORS and used in password-reset links
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    #[serde(default = "default_storage")]
    pub storage: StorageBackend,
}

/// `DATABASE_*`
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
}

/// `JWT_*`
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,

    /// Session lifetime in seconds, also used as the cookie Max-Age
    #[serde(default = "default_jwt_access_ttl")]
    pub access_token_ttl: i64,
}

/// `SMTP_*`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmtpConfig {
    /// Mail is logged instead of sent when unset
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_smtp_from")]
    pub from: String,
}

/// `MEDIA_*`
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Object-store cleanup is disabled when unset
    #[serde(default)]
    pub bucket: Option<String>,

    #[serde(default = "default_profile_pic_url")]
    pub default_profile_pic_url: String,
}

// Default value functions
fn default_app_env() -> String {
    "development".to_string()
}

fn default_app_host() -> String {
    "0.0.0.0".to_string()
}

fn default_app_port() -> u16 {
    8000
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_storage() -> StorageBackend {
    StorageBackend::Postgres
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_jwt_access_ttl() -> i64 {
    86400 // 1 day
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from() -> String {
    "noreply@social-api.local".to_string()
}

fn default_profile_pic_url() -> String {
    "https://social-api-media.s3.amazonaws.com/defaultpfp.jpeg".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenv::dotenv().ok();

        Ok(Config {
            app: envy::prefixed("APP_").from_env()?,
            database: envy::prefixed("DATABASE_").from_env()?,
            jwt: envy::prefixed("JWT_").from_env()?,
            smtp: envy::prefixed("SMTP_").from_env()?,
            media: envy::prefixed("MEDIA_").from_env()?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env == "production"
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}
