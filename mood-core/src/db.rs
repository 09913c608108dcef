//! SQLite history store.
//!
//! Every operation opens its own connection and closes it before returning;
//! there is no pool. Rows are append-only.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};

use crate::config::{CorruptStorePolicy, DatabaseConfig};
use crate::error::MoodError;
use crate::models::{NewSentiment, SentimentRecord};

const CREATE_SENTIMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS sentiments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL,
    sentiment_label TEXT NOT NULL,
    sentiment_score REAL NOT NULL,
    timestamp TEXT NOT NULL
)
"#;

const INTEGRITY_CHECK_FAILED: &str = "integrity check failed";

// Primary result codes; extended codes carry them in the low byte.
const SQLITE_CORRUPT: i32 = 11;
const SQLITE_NOTADB: i32 = 26;

/// What `ensure_database` found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreStatus {
    Created,
    Existing,
    /// The file was unreadable and has been replaced by an empty store.
    /// `backup` holds the moved-aside file when the policy kept it.
    Recovered { backup: Option<PathBuf> },
}

pub async fn connect(path: &Path) -> Result<SqliteConnection, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    options.connect().await
}

/// Prepare the store at startup.
///
/// A missing file gets a fresh schema. An existing file must pass
/// `PRAGMA quick_check`; if it does not, `config.on_corrupt` decides.
pub async fn ensure_database(config: &DatabaseConfig) -> Result<StoreStatus, MoodError> {
    let path = config.path.as_path();

    if path.is_dir() {
        return Err(MoodError::StoreIsDirectory {
            path: path.display().to_string(),
        });
    }
    if !path.exists() {
        create_schema(path).await?;
        tracing::info!(path = %path.display(), "Created sentiment store");
        return Ok(StoreStatus::Created);
    }

    match probe(path).await {
        Ok(()) => {
            create_schema(path).await?;
            tracing::info!(path = %path.display(), "Opened existing sentiment store");
            Ok(StoreStatus::Existing)
        }
        Err(e) if is_unreadable(&e) => recover(path, config.on_corrupt, &e.to_string()).await,
        Err(e) => Err(e.into()),
    }
}

/// Check that the file opens as SQLite and passes a quick integrity check.
pub async fn probe(path: &Path) -> Result<(), sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(false);
    let mut conn = options.connect().await?;
    let (verdict,): (String,) = sqlx::query_as("PRAGMA quick_check")
        .fetch_one(&mut conn)
        .await?;
    conn.close().await?;

    if verdict != "ok" {
        return Err(sqlx::Error::Protocol(format!(
            "{INTEGRITY_CHECK_FAILED}: {verdict}"
        )));
    }
    Ok(())
}

pub async fn create_schema(path: &Path) -> Result<(), sqlx::Error> {
    let mut conn = connect(path).await?;
    sqlx::query(CREATE_SENTIMENTS).execute(&mut conn).await?;
    conn.close().await
}

/// Append one record and return its id.
pub async fn insert_sentiment(path: &Path, row: &NewSentiment) -> Result<i64, sqlx::Error> {
    let mut conn = connect(path).await?;
    let result = sqlx::query(
        "INSERT INTO sentiments (text, sentiment_label, sentiment_score, timestamp) VALUES (?, ?, ?, ?)",
    )
    .bind(&row.text)
    .bind(row.label.as_str())
    .bind(row.score)
    .bind(&row.timestamp)
    .execute(&mut conn)
    .await?;
    conn.close().await?;
    Ok(result.last_insert_rowid())
}

/// Full-table scan in the store's natural row order.
pub async fn list_sentiments(path: &Path) -> Result<Vec<SentimentRecord>, sqlx::Error> {
    let mut conn = connect(path).await?;
    let rows = sqlx::query_as::<_, SentimentRecord>(
        "SELECT id, text, sentiment_label, sentiment_score, timestamp FROM sentiments",
    )
    .fetch_all(&mut conn)
    .await?;
    conn.close().await?;
    Ok(rows)
}

pub async fn count_sentiments(path: &Path) -> Result<i64, sqlx::Error> {
    let mut conn = connect(path).await?;
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM sentiments")
        .fetch_one(&mut conn)
        .await?;
    conn.close().await?;
    Ok(count)
}

/// True only when the file itself is damaged or not SQLite. Busy, locked,
/// permission and open failures are not corruption.
fn is_unreadable(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .map(|code| matches!(code & 0xff, SQLITE_CORRUPT | SQLITE_NOTADB))
            .unwrap_or(false),
        sqlx::Error::Protocol(msg) => msg.starts_with(INTEGRITY_CHECK_FAILED),
        _ => false,
    }
}

async fn recover(
    path: &Path,
    policy: CorruptStorePolicy,
    reason: &str,
) -> Result<StoreStatus, MoodError> {
    let backup = match policy {
        CorruptStorePolicy::Fail => {
            tracing::error!(path = %path.display(), %reason, "Sentiment store is unreadable");
            return Err(MoodError::CorruptStore {
                path: path.display().to_string(),
                reason: reason.to_string(),
            });
        }
        CorruptStorePolicy::Recreate => {
            tracing::warn!(
                path = %path.display(),
                %reason,
                "Sentiment store is unreadable, deleting it and starting empty"
            );
            std::fs::remove_file(path)?;
            None
        }
        CorruptStorePolicy::Backup => {
            let target = backup_path(path);
            std::fs::rename(path, &target)?;
            tracing::warn!(
                path = %path.display(),
                backup = %target.display(),
                %reason,
                "Sentiment store is unreadable, moved it aside and starting empty"
            );
            Some(target)
        }
    };

    create_schema(path).await?;
    Ok(StoreStatus::Recovered { backup })
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(
        ".corrupt-{}",
        chrono::Local::now().format("%Y%m%d%H%M%S")
    ));
    PathBuf::from(name)
}
