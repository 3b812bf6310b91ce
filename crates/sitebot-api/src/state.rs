//! Application state shared across all route handlers.
//!
//! AppState is passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use sitebot_chat::ResponseOrchestrator;
use sitebot_core::config::SitebotConfig;

use crate::registry::ChatbotRegistry;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration, fixed at startup.
    pub config: Arc<SitebotConfig>,
    /// Chatbots and their conversations.
    pub registry: Arc<ChatbotRegistry>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState around the given orchestrator.
    pub fn new(config: SitebotConfig, orchestrator: Arc<ResponseOrchestrator>) -> Self {
        let registry = ChatbotRegistry::new(orchestrator, config.chat.clone());
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            start_time: Instant::now(),
        }
    }
}
