use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoodError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store path {path} is a directory, not a SQLite file")]
    StoreIsDirectory { path: String },

    #[error("Store at {path} is unreadable and on_corrupt = \"fail\": {reason}")]
    CorruptStore { path: String, reason: String },
}
