use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tutorhub_api::config::ServerConfig;
use tutorhub_api::notifications::EmailDispatcher;
use tutorhub_api::router::build_app_router;
use tutorhub_api::state::AppState;
use tutorhub_api::background;
use tutorhub_events::calendar::CalendarConfig;
use tutorhub_events::{
    CalendarSync, EmailConfig, EmailDelivery, EventBus, HttpCalendarProvider, ReminderScheduler,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tutorhub_api=debug,tutorhub_events=debug,tower_http=debug".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        consults = config.features.consults,
        reschedule = config.features.reschedule,
        "Loaded server configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = tutorhub_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    tutorhub_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    tutorhub_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let cancel = CancellationToken::new();
    let mut listeners: Vec<JoinHandle<()>> = Vec::new();
    let mut jobs: Vec<JoinHandle<()>> = Vec::new();

    // --- Email: dispatcher + reminders ---
    match EmailConfig::from_env() {
        Some(email_config) => {
            let email = Arc::new(EmailDelivery::new(email_config));

            let dispatcher =
                EmailDispatcher::new(pool.clone(), Arc::clone(&email), config.app_url.clone());
            listeners.push(tokio::spawn(dispatcher.run(event_bus.subscribe())));

            let scheduler = ReminderScheduler::new(
                pool.clone(),
                email,
                config.api_url.clone(),
                Duration::from_secs(config.reminder_interval_secs),
            );
            let scheduler_cancel = cancel.clone();
            jobs.push(tokio::spawn(async move {
                scheduler.run(scheduler_cancel).await;
            }));
            tracing::info!("Email notifications and reminders enabled");
        }
        None => tracing::warn!("SMTP_HOST not set, email notifications disabled"),
    }

    // --- Calendar sync ---
    let calendar = match CalendarConfig::from_env() {
        Some(calendar_config) => {
            let provider = HttpCalendarProvider::new(calendar_config)
                .expect("Failed to build calendar client");
            let sync = CalendarSync::new(pool.clone(), Arc::new(provider));

            let listener = sync.clone();
            let receiver = event_bus.subscribe();
            let listener_cancel = cancel.clone();
            jobs.push(tokio::spawn(async move {
                listener.run(receiver, listener_cancel).await;
            }));
            tracing::info!("Calendar sync enabled");
            Some(sync)
        }
        None => {
            tracing::info!("CALENDAR_SYNC_URL not set, calendar sync disabled");
            None
        }
    };

    // --- Token cleanup ---
    jobs.push(tokio::spawn(background::token_cleanup::run(
        pool.clone(),
        Duration::from_secs(config.token_cleanup_interval_secs),
        cancel.clone(),
    )));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        calendar,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    cancel.cancel();
    for handle in jobs {
        let _ = tokio::time::timeout(drain, handle).await;
    }
    tracing::info!("Background jobs stopped");

    // Dropping the last sender closes the channel and ends the dispatcher.
    drop(event_bus);
    for handle in listeners {
        let _ = tokio::time::timeout(drain, handle).await;
    }
    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
