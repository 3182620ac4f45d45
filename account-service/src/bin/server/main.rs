use std::sync::Arc;

use account_service::config::Config;
use account_service::domain::credential::service::AuthService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::notifier::email::SmtpNotifier;
use account_service::outbound::repositories::credential::PostgresCredentialStore;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        smtp_host = %config.smtp.host,
        access_ttl_seconds = config.jwt.access_ttl_seconds,
        reset_window_minutes = config.jwt.reset_window_minutes,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let store = Arc::new(PostgresCredentialStore::new(pg_pool));
    let notifier = Arc::new(
        SmtpNotifier::new(
            &config.smtp.host,
            config.smtp.port,
            config.smtp.username.clone(),
            config.smtp.password.clone(),
            config.smtp.from.clone(),
        )
        .map_err(|e| anyhow::anyhow!("smtp transport setup failed: {e}"))?,
    );

    let auth_service = Arc::new(AuthService::new(
        store,
        notifier,
        config.jwt.secret.as_bytes(),
        Duration::seconds(config.jwt.access_ttl_seconds),
        Duration::minutes(config.jwt.reset_window_minutes),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service);
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
