use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::error::MoodError;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MoodConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// What to do with a store file that exists but cannot be read as SQLite.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CorruptStorePolicy {
    /// Move the file aside as `<file>.corrupt-<timestamp>` and start fresh.
    #[default]
    Backup,
    /// Delete the file and start fresh.
    Recreate,
    /// Refuse to start.
    Fail,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub on_corrupt: CorruptStorePolicy,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sentiment_results.db"),
            on_corrupt: CorruptStorePolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the ONNX export. Empty means the default model directory.
    pub onnx_model_path: String,
    pub max_length: usize,
    pub intra_threads: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            onnx_model_path: String::new(),
            max_length: 512,
            intra_threads: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl MoodConfig {
    /// Load from a TOML file, then apply `MOOD__SECTION__KEY` overrides.
    pub fn load(path: &str) -> Result<Self, MoodError> {
        Self::load_with_env(path, env_overrides())
    }

    fn load_with_env(path: &str, env: Environment) -> Result<Self, MoodError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(env)
            .build()?;
        Ok(s.try_deserialize()?)
    }
}

fn env_overrides() -> Environment {
    Environment::with_prefix("MOOD")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
