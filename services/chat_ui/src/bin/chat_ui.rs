//! services/chat_ui/src/bin/chat_ui.rs

use axum::{
    extract::DefaultBodyLimit,
    http::{header::ACCEPT, header::CONTENT_TYPE, HeaderValue, Method},
    Router,
};
use chat_ui_lib::{
    adapters::{HttpRagBackend, SystemClipboard},
    config::Config,
    error::UiError,
    web::{self, rest::ApiDoc, state::AppState},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), UiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Service Adapters ---
    let http_client = reqwest::Client::builder().build()?;
    let backend = Arc::new(HttpRagBackend::new(http_client, config.rag_api_base.clone()));
    info!("Using RAG backend at {}", config.rag_api_base);
    let clipboard = Arc::new(SystemClipboard::new());

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(backend, clipboard, config.clone()));

    let origin = config.allowed_origin.parse::<HeaderValue>().map_err(|e| {
        UiError::Internal(format!(
            "ALLOWED_ORIGIN '{}' is not a valid header value: {}",
            config.allowed_origin, e
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let ui_router = web::router(app_state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors);

    // Merge the UI router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(ui_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
