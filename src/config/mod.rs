/// Database connection and table creation
pub mod database;

/// Application settings loaded from environment variables
pub mod settings;

/// Species and transformation catalog loading from TOML
pub mod transformations;

pub use settings::AppConfig;
