use std::sync::Arc;

use anyhow::Context;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::EnvFilter;

use teamhub::{
    access::PermissionEngine, chat::ChatService, config::AppConfig, db, gateway::HttpGateway,
    notify::Notifier, roles::SystemRoles, routes, state::ChatState, store::PgStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "chat-service",
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        user_service = %config.user_service_url,
        file_service = %config.file_service_url,
        notifications_enabled = config.notification_service_url.is_some(),
        "loaded configuration"
    );

    let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
    db::run_migrations(&pool)?;

    let store = Arc::new(PgStore::new(pool));
    let system_roles =
        SystemRoles::load(store.as_ref()).context("failed to load system chat roles")?;
    let gateway = Arc::new(HttpGateway::from_config(&config)?);
    let notifier = Notifier::from_config(&config)?;

    let chats = ChatService::new(store.clone(), gateway, notifier, Arc::new(system_roles));
    let permissions = PermissionEngine::new(store);

    let addr = format!("{}:{}", config.server_host, config.chat_service_port);
    let state = ChatState::new(chats, permissions, config);
    let app = routes::chat_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "chat service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        tracing::info!("chat service received shutdown signal");
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
