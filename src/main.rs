use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tokio::{net::TcpListener, signal, sync::mpsc};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use storefront_api as api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(&cfg.log_level, cfg.log_json);

    // Init DB
    let db = api::db::establish_connection(&cfg)
        .await
        .context("failed to connect to the database")?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db)
            .await
            .context("failed running migrations")?;
    }
    let db = Arc::new(db);

    // Init events
    let (event_tx, event_rx) = mpsc::channel(1024);
    let event_sender = api::events::EventSender::new(event_tx);
    tokio::spawn(api::events::process_events(event_rx));

    // Auth service for token issuing and verification
    let auth_service = Arc::new(api::auth::AuthService::new(api::auth::AuthConfig::new(
        cfg.jwt_secret.clone(),
        Duration::from_secs(cfg.jwt_expiration),
    )));

    // Mail backend: SMTP when configured, console otherwise
    let mailer: Arc<dyn api::mailer::Mailer> = match cfg.mail.smtp_url.as_deref() {
        Some(url) => {
            info!("SMTP mail delivery enabled");
            Arc::new(
                api::mailer::SmtpMailer::new(url, &cfg.mail.from_address)
                    .context("failed to build SMTP mailer")?,
            )
        }
        None => {
            info!("SMTP not configured; outgoing mail goes to the log");
            Arc::new(api::mailer::ConsoleMailer)
        }
    };

    // Aggregate app services used by HTTP handlers
    let services = api::handlers::AppServices::new(
        db.clone(),
        Arc::new(event_sender.clone()),
        auth_service.clone(),
        mailer,
    );

    // Compose shared app state
    let state = Arc::new(api::AppState {
        db,
        config: cfg.clone(),
        event_sender,
        auth: auth_service,
        services,
    });

    let app = axum::Router::new()
        .nest("/api/v1", api::api_v1_routes())
        .merge(api::openapi::openapi_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let listener = TcpListener::bind(cfg.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr()))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
