use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use social_api::{
    config::{Config, StorageBackend},
    db::{create_pool, run_migrations, Repositories},
    middleware::MetricsMiddleware,
    routes,
    security::JwtKeys,
    services::{LogMailer, Mailer, MediaStore, NoopMediaStore, S3MediaStore, SmtpMailer},
    AppSettings, AppState,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting social-api v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let repos = match config.app.storage {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database.url, config.database.max_connections)
                .await
                .context("Failed to create database pool")?;
            tracing::info!(
                "Database pool created with {} max connections",
                config.database.max_connections
            );

            let run_migrations_env =
                std::env::var("RUN_MIGRATIONS").unwrap_or_else(|_| "true".into());
            if run_migrations_env != "false" {
                tracing::info!("Running database migrations...");
                run_migrations(&pool)
                    .await
                    .context("Database migrations failed")?;
                tracing::info!("Database migrations completed");
            } else {
                tracing::info!("Skipping database migrations (RUN_MIGRATIONS=false)");
            }

            Repositories::postgres(pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Repositories::in_memory()
        }
    };

    let mailer: Arc<dyn Mailer> = match config.smtp.host.as_deref() {
        Some(host) => {
            tracing::info!("SMTP mailer configured for {}", host);
            Arc::new(SmtpMailer::new(host, &config.smtp).context("Failed to build SMTP mailer")?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set; outgoing email will only be logged");
            Arc::new(LogMailer)
        }
    };

    let media: Arc<dyn MediaStore> = match config.media.bucket.clone() {
        Some(bucket) => {
            let aws = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            tracing::info!("S3 media store configured for bucket {}", bucket);
            Arc::new(S3MediaStore::new(aws_sdk_s3::Client::new(&aws), bucket))
        }
        None => {
            tracing::warn!("MEDIA_BUCKET not set; media deletions are skipped");
            Arc::new(NoopMediaStore)
        }
    };

    let jwt = Arc::new(JwtKeys::new(
        &config.jwt.secret,
        config.jwt.access_token_ttl,
    ));

    let state = AppState::new(repos, mailer, media, jwt.clone(), AppSettings::from(&config));
    let state = web::Data::new(state);

    let bind_address = config.bind_address();
    let frontend_url = config.app.frontend_url.clone();
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .supports_credentials()
            .max_age(3600);

        let jwt = jwt.clone();
        App::new()
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(1024 * 1024))
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(MetricsMiddleware)
            .configure(move |cfg| routes::configure_routes(cfg, jwt))
    })
    .bind(&bind_address)
    .map_err(|e| io::Error::new(e.kind(), format!("Failed to bind {}: {}", bind_address, e)))?
    .run()
    .await?;

    tracing::info!("social-api shut down");
    Ok(())
}
