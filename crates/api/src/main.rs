//! API server entry point.

use std::sync::Arc;

use api::config::{Config, LogFormat};
use messaging::{AmqpPublisher, MessagePublisher, NoOpPublisher};
use product_store::{InMemoryProductRepository, PostgresProductRepository, ProductRepository};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn create_repository(config: &Config) -> Arc<dyn ProductRepository> {
    let Some(url) = &config.database_url else {
        tracing::info!("DATABASE_URL not set, using in-memory product store");
        return Arc::new(InMemoryProductRepository::new());
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .expect("failed to connect to PostgreSQL");
    let repository = PostgresProductRepository::new(pool);
    repository
        .ensure_schema()
        .await
        .expect("failed to create products schema");

    tracing::info!("using PostgreSQL product store");
    Arc::new(repository)
}

async fn create_publisher(config: &Config) -> Arc<dyn MessagePublisher> {
    let Some(url) = &config.amqp_url else {
        tracing::info!("AMQP_URL not set, integration events will only be logged");
        return Arc::new(NoOpPublisher::new());
    };

    let publisher = AmqpPublisher::connect(url, &config.product_exchange)
        .await
        .expect("failed to connect to message broker");
    Arc::new(publisher)
}

#[tokio::main]
async fn main() {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Connect the persistence and publisher ports
    let repository = create_repository(&config).await;
    let publisher = create_publisher(&config).await;

    // 4. Wire the dispatcher and build the application
    let state = api::create_state(
        repository,
        publisher,
        &config.product_exchange,
        config.request_timeout,
    )
    .expect("invalid handler registration");
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
