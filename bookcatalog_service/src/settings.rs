use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::books_repository::MongoBooksRepositoryConfig;

/// Name of the optional settings file looked up in the working directory
const SETTINGS_FILE: &str = "bookcatalog";
const ENV_PREFIX: &str = "BOOKCATALOG";

#[derive(Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// May contain credentials, never log it
    pub mongo_uri: String,
    pub database_name: String,
    pub books_collection: String,
    pub raw_collection: String,
    pub connect_timeout_secs: u64,
    pub use_in_memory_db: bool,
}

impl Settings {
    /// Loads settings from defaults, then `bookcatalog.toml` if present,
    /// then `BOOKCATALOG_*` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name(SETTINGS_FILE).required(false))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()
    }

    /// Values are kept as strings, numbers and flags are converted
    /// only when deserialized into a numeric or bool field
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX).prefix_separator("_")
    }

    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("mongo_uri", "mongodb://localhost:27017")?
            .set_default("database_name", "sample")?
            .set_default("books_collection", "books")?
            .set_default("raw_collection", "data")?
            .set_default("connect_timeout_secs", 10)?
            .set_default("use_in_memory_db", false)
    }

    pub fn mongo_repository_config(&self) -> MongoBooksRepositoryConfig {
        MongoBooksRepositoryConfig {
            uri: self.mongo_uri.clone(),
            database_name: self.database_name.clone(),
            books_collection: self.books_collection.clone(),
            raw_collection: self.raw_collection.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}
