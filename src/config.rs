use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use config::{Config, Environment, File, FileFormat, FileSourceFile};
use secrecy::SecretString;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "configuration";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub quiz: QuizSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizSettings {
    /// Fixed seed for the question picker; entropy is used when unset.
    pub seed: Option<u64>,
}

impl Settings {
    /// Layers defaults, an optional TOML file and `TRIVIA_*` environment variables,
    /// e.g. `TRIVIA_DATABASE__URL=sqlite:trivia.db`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Self::from_sources(file, Environment::with_prefix("TRIVIA"))
    }

    fn from_sources(
        file: File<FileSourceFile, FileFormat>,
        env: Environment,
    ) -> anyhow::Result<Self> {
        Config::builder()
            .set_default("application.host", "127.0.0.1")?
            .set_default("application.port", 5000)?
            .set_default("database.url", "sqlite:trivia.db")?
            .set_default("database.max_connections", 5)?
            .add_source(file)
            .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
            .context("Failed to read configuration")
    }
}
