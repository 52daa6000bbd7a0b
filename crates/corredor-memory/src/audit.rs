//! Audit log — records every processed inbound message.

use corredor_core::error::CorredorError;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

/// An entry to write to the audit log.
pub struct AuditEntry {
    pub channel: String,
    pub sender_id: String,
    pub sender_name: Option<String>,
    pub input_text: String,
    pub status: AuditStatus,
    /// Rows appended to the sheet, when the intake path ran.
    pub saved_rows: Option<i64>,
    /// Error text or dispatch note.
    pub detail: Option<String>,
    pub processing_ms: Option<i64>,
}

/// Outcome of an audited interaction.
pub enum AuditStatus {
    Ok,
    Error,
    /// Message seen but produced no action (e.g. group chatter with no
    /// extractable listing).
    Ignored,
    /// Sender failed the auth check.
    Denied,
}

impl AuditStatus {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Ignored => "ignored",
            Self::Denied => "denied",
        }
    }
}

/// Audit logger backed by SQLite.
pub struct AuditLogger {
    pool: SqlitePool,
}

impl AuditLogger {
    /// Create a new audit logger sharing the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Write an entry to the audit log.
    pub async fn log(&self, entry: &AuditEntry) -> Result<(), CorredorError> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO audit_log \
             (id, channel, sender_id, sender_name, input_text, status, \
              saved_rows, detail, processing_ms) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&entry.channel)
        .bind(&entry.sender_id)
        .bind(&entry.sender_name)
        .bind(&entry.input_text)
        .bind(entry.status.as_str())
        .bind(entry.saved_rows)
        .bind(&entry.detail)
        .bind(entry.processing_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| CorredorError::Memory(format!("audit log write failed: {e}")))?;

        debug!(
            "audit: {} {} [{}] {}",
            entry.channel,
            entry.sender_id,
            entry.status.as_str(),
            truncate(&entry.input_text, 80)
        );

        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
