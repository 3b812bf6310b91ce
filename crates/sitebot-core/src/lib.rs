pub mod config;
pub mod error;
pub mod types;

pub use config::SitebotConfig;
pub use error::{Result, SitebotError};
pub use types::*;
