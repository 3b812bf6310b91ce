//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression,
//! body limits and all endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, put};
use axum::Router;
use sitebot_core::config::SitebotConfig;
use sitebot_core::error::SitebotError;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Upper bound for knowledge base uploads.
const KNOWLEDGE_BASE_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Create the axum Router with all routes and middleware.
///
/// # Arguments
/// * `state` - The shared application state.
///
/// # Returns
/// A fully configured axum Router ready to serve requests.
pub fn create_router(state: AppState) -> Router {
    // The widget is embedded on arbitrary customer websites.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    // Creation and replacement carry whole knowledge bases.
    let knowledge_base_routes = Router::new()
        .route(
            "/chatbots",
            get(handlers::list_chatbots).post(handlers::create_chatbot),
        )
        .route(
            "/chatbots/{id}/knowledge-base",
            put(handlers::replace_knowledge_base),
        )
        .layer(DefaultBodyLimit::max(KNOWLEDGE_BASE_BODY_LIMIT));

    let chatbot_routes = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/chatbots/{id}",
            get(handlers::get_chatbot).delete(handlers::delete_chatbot),
        )
        .route(
            "/chatbots/{id}/messages",
            get(handlers::get_messages)
                .post(handlers::send_message)
                .delete(handlers::reset_messages),
        )
        .route("/chatbots/{id}/embed", get(handlers::embed_snippet))
        .layer(DefaultBodyLimit::max(64 * 1024));

    knowledge_base_routes
        .merge(chatbot_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured host and port.
pub async fn start_server(config: &SitebotConfig, state: AppState) -> Result<(), SitebotError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SitebotError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "API server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| SitebotError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
