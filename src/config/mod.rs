/// Database configuration and connection management
pub mod database;

/// Tunables loaded from config.toml
pub mod settings;
