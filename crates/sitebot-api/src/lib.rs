//! SiteBot API crate - in-memory chatbot registry and axum HTTP server.
//!
//! Hosts chatbot profiles and their test conversations, and exposes them
//! over a small JSON API alongside the embed snippet for each chatbot.

pub mod error;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use registry::{ChatbotRegistry, Exchange};
pub use routes::{create_router, start_server};
pub use state::AppState;
