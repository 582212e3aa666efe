pub mod config;
pub mod error;
pub mod paths;

pub use config::{Config, GoogleConfig, PlexConfig, PlexConnection, ReportConfig, RetryConfig, ServerConfig, WishlistConfig};
pub use error::ConfigError;
pub use paths::{PathManager, catalog_home_override};
