use actix_web::{web, App, HttpServer};
use anyhow::{bail, Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;

use insta_service::config::{Config, LogFormat, StoreBackend};
use insta_service::handlers;
use insta_service::media::{LocalMediaStore, MediaStore};
use insta_service::middleware::{DevIdentityProvider, IdentityProvider, JwtIdentityProvider};
use insta_service::{AppState, MemorySocialStore, PgSocialStore, SocialStore};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "insta_service=info,actix_web=info".into());

    let (json, text) = match format {
        LogFormat::Json => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            ),
            None,
        ),
        LogFormat::Text => (None, Some(tracing_subscriber::fmt::layer())),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .init();
}

async fn build_store(config: &Config) -> Result<Arc<dyn SocialStore>> {
    let db = match (config.store_backend, &config.database) {
        (StoreBackend::Memory, _) => {
            warn!("using in-memory store; data is lost on restart");
            return Ok(Arc::new(MemorySocialStore::new()));
        }
        (StoreBackend::Postgres, Some(db)) => db,
        (StoreBackend::Postgres, None) => bail!("postgres backend selected without DATABASE_URL"),
    };

    let pool = PgPoolOptions::new()
        .max_connections(db.max_connections)
        .min_connections(db.min_connections)
        .acquire_timeout(Duration::from_secs(db.acquire_timeout_secs))
        .connect(&db.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Failed to verify database connection")?;
    info!("Database pool created and verified");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    Ok(Arc::new(PgSocialStore::new(pool)))
}

fn build_identity(config: &Config) -> Result<Arc<dyn IdentityProvider>> {
    if let Some(pem) = &config.auth.jwt_public_key_pem {
        let provider = JwtIdentityProvider::from_rsa_pem(pem, config.auth.jwt_issuer.as_deref())
            .context("Failed to load JWT_PUBLIC_KEY_PEM")?;
        info!("JWT identity provider configured");
        return Ok(Arc::new(provider));
    }

    if config.app.is_development() {
        warn!("JWT_PUBLIC_KEY_PEM not set; bearer tokens are taken as raw user ids");
        return Ok(Arc::new(DevIdentityProvider));
    }

    bail!("JWT_PUBLIC_KEY_PEM is required outside development")
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format);

    info!(
        env = %config.app.env,
        http_port = config.app.http_port,
        backend = ?config.store_backend,
        "Starting insta-service"
    );

    let store = build_store(&config).await?;
    let identity = build_identity(&config)?;

    tokio::fs::create_dir_all(&config.media.root)
        .await
        .with_context(|| format!("Failed to create media root {}", config.media.root))?;
    let media: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(
        config.media.root.clone(),
        config.media.base_url.clone(),
    ));

    let state = web::Data::new(AppState::new(store, media));
    let identity = web::Data::new(identity);

    let bind_addr = (config.app.host.clone(), config.app.http_port);
    info!(host = %bind_addr.0, port = bind_addr.1, "HTTP server listening");

    HttpServer::new(move || {
        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(state.clone())
            .app_data(identity.clone())
            .configure(handlers::configure)
    })
    .bind(bind_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    info!("insta-service stopped");
    Ok(())
}
