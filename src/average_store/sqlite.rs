// SQLite-backed average store. Reads come from a cache loaded at open;
// writes go through a channel to a dedicated writer task.

use super::AverageStore;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError, RwLock};
use tokio::sync::mpsc;
use tracing::instrument;

struct PendingWrite {
    key: String,
    value: f64,
}

pub struct SqliteAverageStore {
    pool: SqlitePool,
    cache: RwLock<HashMap<String, f64>>,
    write_tx: Mutex<Option<mpsc::UnboundedSender<PendingWrite>>>,
    writer: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl SqliteAverageStore {
    /// Opens (creating if needed) the database at `path` and starts the writer.
    /// Must be called from within a tokio runtime.
    pub async fn open(path: &str) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new().connect_with(opts).await?;
        init(&pool).await?;

        let cache = load_all(&pool).await?;
        tracing::debug!(keys = cache.len(), "average store loaded");

        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let writer = spawn_writer(pool.clone(), write_rx);

        Ok(Self {
            pool,
            cache: RwLock::new(cache),
            write_tx: Mutex::new(Some(write_tx)),
            writer: Mutex::new(Some(writer)),
        })
    }

    /// Every persisted row, read from the database rather than the cache.
    pub async fn load_all(&self) -> anyhow::Result<HashMap<String, f64>> {
        load_all(&self.pool).await
    }

    /// Stops accepting writes and waits until queued writes hit the database.
    /// Later `set` calls still update the cache but are logged as unpersisted.
    pub async fn shutdown(&self) {
        let tx = self
            .write_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(tx);
        let writer = self
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = writer
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "average store writer task failed");
        }
    }
}

impl AverageStore for SqliteAverageStore {
    fn get(&self, key: &str) -> f64 {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0.0)
    }

    fn set(&self, key: &str, value: f64) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);

        let guard = self.write_tx.lock().unwrap_or_else(PoisonError::into_inner);
        let sent = guard.as_ref().is_some_and(|tx| {
            tx.send(PendingWrite {
                key: key.to_string(),
                value,
            })
            .is_ok()
        });
        if !sent {
            tracing::warn!(
                network_key = key,
                average_speed = value,
                operation = "set_average",
                "average store writer closed; value kept in memory only"
            );
        }
    }
}

async fn init(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS network_speed (
            network_key TEXT PRIMARY KEY,
            average_speed REAL NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn load_all(pool: &SqlitePool) -> anyhow::Result<HashMap<String, f64>> {
    let rows = sqlx::query("SELECT network_key, average_speed FROM network_speed")
        .fetch_all(pool)
        .await?;
    let mut out = HashMap::with_capacity(rows.len());
    for row in rows {
        let key: String = row.try_get("network_key")?;
        let value: f64 = row.try_get("average_speed")?;
        out.insert(key, value);
    }
    Ok(out)
}

/// Drains the write channel into the database until every sender is gone.
fn spawn_writer(
    pool: SqlitePool,
    mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(write) = write_rx.recv().await {
            if let Err(e) = upsert(&pool, &write.key, write.value).await {
                tracing::warn!(
                    error = %e,
                    network_key = %write.key,
                    operation = "upsert_average",
                    "failed to persist average speed"
                );
            }
        }
        tracing::debug!("average store writer shutting down");
    })
}

#[instrument(skip(pool), fields(repo = "average_store", operation = "upsert_average"))]
async fn upsert(pool: &SqlitePool, key: &str, value: f64) -> anyhow::Result<()> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    sqlx::query(
        "INSERT INTO network_speed (network_key, average_speed, updated_at) VALUES ($1, $2, $3)
         ON CONFLICT(network_key) DO UPDATE SET average_speed = excluded.average_speed, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(value)
    .bind(now_ms)
    .execute(pool)
    .await?;
    Ok(())
}
