//! Recipe platform server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p recipe-server
//! ```
//!
//! Configuration is loaded from environment variables. The process hosts
//! both halves of the core: the WebSocket delivery endpoint and the
//! moderation queue consumer, wired here and nowhere else.

use recipe_cache::{OnlineStatusStore, PublishQueue, RedisPool, UserProfileCache};
use recipe_common::{try_init_tracing, AppConfig, JwtService, TracingConfig};
use recipe_gateway::{
    create_app, BroadcastStatusListener, GatewayState, NotificationRouter, PresenceManager,
    SessionRegistry,
};
use recipe_moderation::{spawn_consumer_loop, ContentValidator, ModerationConsumer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing(TracingConfig::default()) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Server failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting recipe server...");

    let config = AppConfig::from_env()?;
    info!(
        env = ?config.app.env,
        port = config.server.port,
        "Configuration loaded"
    );

    // Storage collaborator
    info!("Connecting to PostgreSQL...");
    let db_config = recipe_db::PgPoolConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
    };
    let pg_pool = recipe_db::create_pool(&db_config).await?;
    info!("PostgreSQL connection established");

    // Shared cache
    info!("Connecting to Redis...");
    let redis_pool = RedisPool::from_config(&config.redis)?;
    redis_pool.health_check().await?;
    info!("Redis connection established");

    // Repositories
    let recipe_repo = Arc::new(recipe_db::PgRecipeRepository::new(pg_pool.clone()));
    let step_repo = Arc::new(recipe_db::PgRecipeStepRepository::new(pg_pool.clone()));
    let user_repo = Arc::new(recipe_db::PgUserRepository::new(pg_pool));

    // Identity boundary
    let jwt = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.token_expiry,
    ));

    // Delivery subsystem
    let registry = SessionRegistry::new_shared();
    let online = OnlineStatusStore::new(redis_pool.clone());
    let presence = Arc::new(PresenceManager::new(online.clone(), registry.clone()));
    let router = Arc::new(NotificationRouter::new(
        registry.clone(),
        user_repo.clone(),
        online,
    ));

    // Presence transitions broadcast through the router; registered here so
    // the gateway stays free of a dependency on the notification layer
    presence.add_listener(Arc::new(BroadcastStatusListener::new(router.clone())));

    // Moderation pipeline
    let consumer = Arc::new(ModerationConsumer::new(
        PublishQueue::new(redis_pool.clone(), config.moderation.consumer_name.clone()),
        recipe_repo,
        step_repo,
        user_repo,
        UserProfileCache::new(redis_pool),
        ContentValidator::new(&config.moderation.extra_denylist),
        router,
        config.moderation.batch_size,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer_handle = spawn_consumer_loop(
        consumer,
        Duration::from_secs(config.moderation.poll_interval_secs),
        shutdown_rx,
    );

    // WebSocket endpoint
    let state = GatewayState::new(registry, presence, jwt);
    let app = create_app(state);

    let addr: SocketAddr = config.server.address().parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on ws://{addr}/ws");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let the in-flight polling cycle finish before exiting
    shutdown_tx.send(true).ok();
    consumer_handle.await.ok();

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    info!("Shutdown signal received");
}
