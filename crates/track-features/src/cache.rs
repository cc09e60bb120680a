use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{debug, warn};

use crate::record::FeatureRecord;

/// SQLite-backed cache for feature records.
///
/// Cache key is `(content_hash, version)`. When the feature version bumps,
/// stale entries are recomputed on next access. Rows that no longer decode
/// are treated as misses.
pub struct FeatureCache {
    connection: Mutex<Connection>,
}

impl FeatureCache {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating cache directory {}", parent.display()))?;
        }

        let connection = Connection::open(db_path).context("opening feature cache db")?;
        Self::init(connection)
    }

    /// Cache that lives only as long as the process.
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().context("opening in-memory feature cache")?;
        Self::init(connection)
    }

    fn init(connection: Connection) -> Result<Self> {
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS features (
                    content_hash TEXT NOT NULL,
                    version      INTEGER NOT NULL,
                    created_at   TEXT NOT NULL,
                    record_json  TEXT NOT NULL,
                    PRIMARY KEY (content_hash, version)
                );",
            )
            .context("creating features table")?;

        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn get(&self, content_hash: &str, version: u32) -> Result<Option<FeatureRecord>> {
        let conn = self
            .connection
            .lock()
            .map_err(|_| anyhow::anyhow!("cache mutex poisoned"))?;

        let mut stmt = conn.prepare_cached(
            "SELECT record_json FROM features WHERE content_hash = ?1 AND version = ?2",
        )?;

        let result = stmt.query_row(rusqlite::params![content_hash, version], |row| {
            let json: String = row.get(0)?;
            Ok(json)
        });

        match result {
            Ok(json) => match serde_json::from_str::<FeatureRecord>(&json) {
                Ok(record) => Ok(Some(record)),
                Err(e) => {
                    warn!(
                        hash = content_hash,
                        version,
                        error = %e,
                        "undecodable cached features, ignoring"
                    );
                    Ok(None)
                }
            },
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("querying feature cache"),
        }
    }

    /// Store `record`. Records holding NaN or infinite values are skipped.
    pub fn put(&self, content_hash: &str, version: u32, record: &FeatureRecord) -> Result<()> {
        if !record.is_finite() {
            debug!(hash = content_hash, "non-finite features, not caching");
            return Ok(());
        }

        let json = serde_json::to_string(record).context("serializing features for cache")?;
        let now = chrono::Utc::now().to_rfc3339();

        let conn = self
            .connection
            .lock()
            .map_err(|_| anyhow::anyhow!("cache mutex poisoned"))?;

        conn.execute(
            "INSERT OR REPLACE INTO features (content_hash, version, created_at, record_json)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![content_hash, version, now, json],
        )?;

        Ok(())
    }
}
