use anime_schedule_service::build_router;
use anime_schedule_service::catalog::Catalog;
use anime_schedule_service::config::Config;
use anime_schedule_service::logger::{Event, Logger};
use anyhow::{Context, Result};
use serde_json::json;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    let logger = Logger::new("anime-schedule-service");
    let config = Arc::new(Config::load().context("failed to load configuration")?);
    let catalog = Arc::new(Catalog::load(&config).context("failed to load static catalog")?);

    logger.log(
        Event::CatalogLoaded,
        json!({
            "lists": catalog.list_count(),
            "calendars": catalog.calendar_count(),
        }),
    );

    if matches!(env::args().nth(1).as_deref(), Some("check-config")) {
        logger.log(
            Event::ConfigCheckPassed,
            serde_json::to_value(config.as_ref()).unwrap_or_else(|_| json!({ "status": "ok" })),
        );
        return Ok(());
    }

    let router = build_router(config.clone(), catalog, logger.clone())?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    logger.log(Event::ServerStarting, json!({ "port": config.port }));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    logger.log(Event::ServerStopped, json!({}));
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
}
