//! Libris Server - Library Catalog

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use libris_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("libris_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Libris Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository);

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Public catalog views
        .route("/", get(api::catalog::index))
        .route("/books/", get(api::catalog::list_books))
        .route("/book/:id", get(api::catalog::get_book))
        .route("/mybooks/", get(api::catalog::my_books))
        // Admin console
        .route("/admin/schema", get(api::admin::get_schema))
        .route("/admin/genres", get(api::admin::list_genres))
        .route("/admin/genres", post(api::admin::create_genre))
        .route("/admin/genres/:id", put(api::admin::update_genre))
        .route("/admin/genres/:id", delete(api::admin::delete_genre))
        .route("/admin/authors", get(api::admin::list_authors))
        .route("/admin/authors", post(api::admin::create_author))
        .route("/admin/authors/:id", get(api::admin::get_author))
        .route("/admin/authors/:id", put(api::admin::update_author))
        .route("/admin/authors/:id", delete(api::admin::delete_author))
        .route("/admin/books", post(api::admin::create_book))
        .route("/admin/books/:id", put(api::admin::update_book))
        .route("/admin/books/:id", delete(api::admin::delete_book))
        .route("/admin/books/:id/instances", get(api::admin::list_book_instances))
        .route("/admin/books/:id/instances", post(api::admin::create_book_instance))
        .route("/admin/instances", get(api::admin::list_instances))
        .route("/admin/instances/:id", get(api::admin::get_instance))
        .route("/admin/instances/:id", put(api::admin::update_instance))
        .route("/admin/instances/:id", delete(api::admin::delete_instance))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .merge(routes)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
