use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::{Context, bail};
use std::sync::Arc;
use std::time::Duration;

mod api;
mod attendance;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod shift_resolver;
mod store;

use attendance::clock::SystemClock;
use attendance::timezone::is_valid_timezone;
use attendance::{AttendanceService, AttendanceSettings};
use config::Config;
use db::{init_db, run_migrations};
use routes::Limiters;
use shift_resolver::MySqlShiftResolver;
use store::mysql::MySqlStore;

use crate::docs::openapi_with_prefix;
use tracing::info;
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRM attendance service"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "attendance.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    if !is_valid_timezone(&config.default_timezone) {
        bail!("DEFAULT_TIMEZONE is not a valid IANA zone: {}", config.default_timezone);
    }

    info!("Server starting...");

    let pool = init_db(&config.database_url, config.db_max_connections).await?;
    if config.run_migrations {
        run_migrations(&pool).await?;
        info!("Migrations applied");
    }

    let service = AttendanceService::new(
        Arc::new(MySqlStore::new(
            pool.clone(),
            Duration::from_secs(config.company_settings_cache_ttl_secs),
        )),
        Arc::new(MySqlShiftResolver::new(pool.clone())),
        Arc::new(SystemClock),
        AttendanceSettings::from(&config),
    );
    let limiters = Limiters::from_config(&config)?;

    let server_addr = config.server_addr.clone();
    let openapi = openapi_with_prefix(&config.api_prefix);
    let service = Data::new(service);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", openapi.clone()),
            )
            .app_data(service.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config, &limiters))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
