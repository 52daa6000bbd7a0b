//! SQLite-backed configuration store.

use corredor_core::{config::MemoryConfig, error::CorredorError, shellexpand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

/// A registered spreadsheet flagged as the designated property log.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignatedSheet {
    pub sheet_id: String,
    pub name: String,
}

/// Persistent store backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Create a new store, running migrations on first use.
    pub async fn new(config: &MemoryConfig) -> Result<Self, CorredorError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| CorredorError::Memory(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| CorredorError::Memory(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| CorredorError::Memory(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("store initialized at {db_path}");

        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// An ephemeral in-memory store. Single connection, since every
    /// sqlite `:memory:` connection is its own database.
    pub async fn in_memory() -> Result<Self, CorredorError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| CorredorError::Memory(format!("invalid db path: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| CorredorError::Memory(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), CorredorError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| CorredorError::Memory(format!("failed to create migrations table: {e}")))?;

        let migrations: &[(&str, &str)] = &[
            ("001_init", include_str!("../migrations/001_init.sql")),
            (
                "002_audit_log",
                include_str!("../migrations/002_audit_log.sql"),
            ),
        ];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        CorredorError::Memory(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| CorredorError::Memory(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    CorredorError::Memory(format!("failed to record migration {name}: {e}"))
                })?;
        }
        Ok(())
    }

    /// The single active spreadsheet flagged as the property log.
    pub async fn designated_sheet(&self) -> Result<Option<DesignatedSheet>, CorredorError> {
        let row: Option<(String, String)> = sqlx::query_as(
            "SELECT sheet_id, name FROM sheets \
             WHERE is_property_log = 1 AND is_active = 1 \
             ORDER BY created_at ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CorredorError::Memory(format!("query failed: {e}")))?;

        Ok(row.map(|(sheet_id, name)| DesignatedSheet { sheet_id, name }))
    }

    /// Register a spreadsheet, optionally flagging it as the property log.
    /// Flagging clears the flag on every other sheet.
    pub async fn register_sheet(
        &self,
        sheet_id: &str,
        name: &str,
        is_property_log: bool,
    ) -> Result<(), CorredorError> {
        if is_property_log {
            sqlx::query("UPDATE sheets SET is_property_log = 0")
                .execute(&self.pool)
                .await
                .map_err(|e| CorredorError::Memory(format!("update failed: {e}")))?;
        }

        sqlx::query(
            "INSERT INTO sheets (id, sheet_id, name, is_property_log) VALUES (?, ?, ?, ?) \
             ON CONFLICT(sheet_id) DO UPDATE SET name = excluded.name, \
             is_property_log = excluded.is_property_log",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(sheet_id)
        .bind(name)
        .bind(is_property_log as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| CorredorError::Memory(format!("insert failed: {e}")))?;

        Ok(())
    }

    /// Read a runtime config value.
    pub async fn config_value(&self, key: &str) -> Result<Option<String>, CorredorError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM app_config WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| CorredorError::Memory(format!("query failed: {e}")))?;

        Ok(row.map(|(value,)| value))
    }

    /// Write a runtime config value.
    pub async fn set_config_value(&self, key: &str, value: &str) -> Result<(), CorredorError> {
        sqlx::query(
            "INSERT INTO app_config (key, value, updated_at) VALUES (?, ?, datetime('now')) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
             updated_at = datetime('now')",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| CorredorError::Memory(format!("insert failed: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) async fn test_store() -> Store {
    Store::in_memory().await.unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_designated_sheet_initially() {
        let store = test_store().await;
        assert_eq!(store.designated_sheet().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_register_and_find_designated_sheet() {
        let store = test_store().await;
        store
            .register_sheet("1abcDEF", "Propiedades 2025", true)
            .await
            .unwrap();

        let designated = store.designated_sheet().await.unwrap().unwrap();
        assert_eq!(designated.sheet_id, "1abcDEF");
        assert_eq!(designated.name, "Propiedades 2025");
    }

    #[tokio::test]
    async fn test_flag_moves_to_latest_designation() {
        let store = test_store().await;
        store.register_sheet("sheet-a", "A", true).await.unwrap();
        store.register_sheet("sheet-b", "B", true).await.unwrap();

        let designated = store.designated_sheet().await.unwrap().unwrap();
        assert_eq!(designated.sheet_id, "sheet-b");
    }

    #[tokio::test]
    async fn test_unflagged_sheet_is_not_designated() {
        let store = test_store().await;
        store.register_sheet("sheet-a", "A", false).await.unwrap();
        assert_eq!(store.designated_sheet().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_config_value_round_trip() {
        let store = test_store().await;
        assert_eq!(store.config_value("GEMINI_API_KEY").await.unwrap(), None);

        store
            .set_config_value("GEMINI_API_KEY", "AIza-one")
            .await
            .unwrap();
        assert_eq!(
            store.config_value("GEMINI_API_KEY").await.unwrap(),
            Some("AIza-one".into())
        );

        store
            .set_config_value("GEMINI_API_KEY", "AIza-two")
            .await
            .unwrap();
        assert_eq!(
            store.config_value("GEMINI_API_KEY").await.unwrap(),
            Some("AIza-two".into())
        );
    }
}
