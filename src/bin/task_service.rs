use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::EnvFilter;

use teamhub::{
    config::AppConfig, db, gateway::HttpGateway, notify::Notifier, routes, state::TaskState,
    store::PgStore, task::TaskService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "task-service",
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        user_service = %config.user_service_url,
        chat_service = %config.chat_service_url,
        notifications_enabled = config.notification_service_url.is_some(),
        "loaded configuration"
    );

    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    db::run_migrations(&pool)?;

    let store = Arc::new(PgStore::new(pool));
    let gateway = Arc::new(HttpGateway::from_config(&config)?);
    let notifier = Notifier::from_config(&config)?;
    let tasks = TaskService::new(store, gateway, notifier);

    let addr = format!("{}:{}", config.server_host, config.task_service_port);
    let app = routes::task_router(TaskState::new(tasks, config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "task service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        tracing::info!("task service received shutdown signal");
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
