//! Follow-up scheduler: walks the property log and asks brokers whether
//! listings are still active.
//!
//! Each row is a little state machine keyed by UID, with the stage encoded
//! in the Status cell: "Nuevo" (stage 0) → "Activo (Etapa 1)" → "Activo
//! (Etapa 2)" → "Activo (Etapa 3)", which repeats once per calendar day.
//! "Cerrado" is terminal and only ever set from a broker's confirmation.
//! State advances only after a successful send, so a failed send retries
//! on the next run.

use chrono::{Local, NaiveDate};
use corredor_core::{message::OutgoingMessage, traits::Channel};
use corredor_sheets::{schema::cell, Column, IndexedRow, SheetStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Fixed phrase embedded in every follow-up message; replies are
/// correlated back to a row by finding this marker plus the UID in the
/// quoted text.
pub(crate) const FOLLOWUP_MARKER: &str = "Respecto a tu publicación con ID [";

/// A stage advance decided for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transition {
    pub next_stage: u32,
    pub prefix: &'static str,
}

/// Counters for one scheduler run.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct RunStats {
    pub sent: usize,
    pub advanced: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Walks rows and delivers follow-ups. Holds the re-entrancy flag: a tick
/// that would overlap a still-running one is dropped, never queued.
pub(crate) struct FollowUpRunner {
    sheets: Arc<dyn SheetStore>,
    channel: Arc<dyn Channel>,
    busy: AtomicBool,
}

impl FollowUpRunner {
    pub fn new(sheets: Arc<dyn SheetStore>, channel: Arc<dyn Channel>) -> Self {
        Self {
            sheets,
            channel,
            busy: AtomicBool::new(false),
        }
    }

    /// Try to claim the busy flag. Returns false when a run is in flight.
    fn begin(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn finish(&self) {
        self.busy.store(false, Ordering::SeqCst);
    }

    /// Execute one scheduler run over the given sheet.
    ///
    /// `today` drives the stage decisions and `now_stamp` is written to the
    /// last-follow-up column; both are injected so runs are reproducible.
    pub async fn run(
        &self,
        sheet_id: &str,
        tab: &str,
        today: NaiveDate,
        now_stamp: &str,
    ) -> RunStats {
        if !self.begin() {
            warn!("follow-up run still executing, skipping this tick");
            return RunStats::default();
        }

        let stats = self.walk_rows(sheet_id, tab, today, now_stamp).await;
        self.finish();

        info!(
            "follow-up run complete: {} sent, {} advanced, {} skipped, {} errors",
            stats.sent, stats.advanced, stats.skipped, stats.errors
        );
        stats
    }

    async fn walk_rows(
        &self,
        sheet_id: &str,
        tab: &str,
        today: NaiveDate,
        now_stamp: &str,
    ) -> RunStats {
        let mut stats = RunStats::default();

        let rows = match self.sheets.rows_with_index(sheet_id, tab).await {
            Ok(rows) => rows,
            Err(e) => {
                error!("follow-up: failed to read rows: {e}");
                stats.errors += 1;
                return stats;
            }
        };

        for IndexedRow { row_index, cells } in &rows {
            let uid = cell(cells, Column::Uid);
            let status = cell(cells, Column::Status);
            let published = cell(cells, Column::FechaPublicacion);
            let broker = cell(cells, Column::TelefonoCorredor);

            let Some(stage) = parse_stage(status) else {
                // Cerrado or unknown status: not ours to touch.
                continue;
            };

            if uid.is_empty() || published.is_empty() || broker.is_empty() {
                warn!("follow-up: incomplete row {row_index} (uid '{uid}'), skipping");
                stats.skipped += 1;
                continue;
            }

            let Ok(publication_date) = NaiveDate::parse_from_str(published, "%Y-%m-%d") else {
                warn!("follow-up: invalid publication date '{published}' for {uid}, skipping");
                stats.skipped += 1;
                continue;
            };

            let days_since = (today - publication_date).num_days();
            let last_followup = parse_last_followup(cell(cells, Column::UltimoSeguimiento));

            let Some(transition) = next_transition(stage, days_since, last_followup, today) else {
                continue;
            };

            let message = followup_message(transition.prefix, uid);
            let recipient = broker_jid(broker);

            info!(
                "follow-up: sending stage {} check for {uid} to {recipient}",
                transition.next_stage
            );
            if let Err(e) = self
                .channel
                .send(OutgoingMessage {
                    text: message,
                    reply_target: Some(recipient),
                })
                .await
            {
                // No state advance on a failed send; next run retries.
                error!("follow-up: send failed for {uid}: {e}");
                stats.errors += 1;
                continue;
            }
            stats.sent += 1;

            let new_status = format!("Activo (Etapa {})", transition.next_stage);
            match self
                .sheets
                .update_cells_by_uid(
                    sheet_id,
                    tab,
                    uid,
                    &[
                        (Column::Status, new_status.clone()),
                        (Column::UltimoSeguimiento, now_stamp.to_string()),
                    ],
                )
                .await
            {
                Ok(()) => {
                    stats.advanced += 1;
                    info!("follow-up: {uid} advanced to '{new_status}'");
                }
                Err(e) => {
                    // The message went out but the row did not advance; the
                    // broker may get a duplicate next run. Acceptable.
                    error!("follow-up: failed to update row for {uid}: {e}");
                    stats.errors += 1;
                }
            }
        }

        stats
    }
}

/// Decode the numeric stage from a Status cell.
///
/// Returns `None` for terminal or foreign statuses, which the scheduler
/// must never touch.
pub(crate) fn parse_stage(status: &str) -> Option<u32> {
    let status = status.trim();
    match status {
        "Nuevo" | "Activo" => Some(0),
        _ => status
            .strip_prefix("Activo (Etapa ")?
            .strip_suffix(')')?
            .trim()
            .parse()
            .ok(),
    }
}

/// Parse the last-follow-up cell ("YYYY-MM-DD HH:MM:SS" or bare date).
pub(crate) fn parse_last_followup(value: &str) -> Option<NaiveDate> {
    let date_part = value.trim().get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// The stage machine: decide whether a row fires this run.
///
/// Stage 3 repeats daily, gated on the last follow-up date so a row is
/// never pinged twice in one calendar day.
pub(crate) fn next_transition(
    stage: u32,
    days_since_publication: i64,
    last_followup: Option<NaiveDate>,
    today: NaiveDate,
) -> Option<Transition> {
    match stage {
        0 if days_since_publication >= 3 => Some(Transition {
            next_stage: 1,
            prefix: "Han pasado 3 días.",
        }),
        1 if days_since_publication >= 5 => Some(Transition {
            next_stage: 2,
            prefix: "Han pasado 5 días.",
        }),
        2 if days_since_publication >= 7 => Some(Transition {
            next_stage: 3,
            prefix: "Verificación (7 días).",
        }),
        3 if last_followup != Some(today) => Some(Transition {
            next_stage: 3,
            prefix: "Verificación diaria.",
        }),
        _ => None,
    }
}

/// Build the follow-up message for a row.
pub(crate) fn followup_message(prefix: &str, uid: &str) -> String {
    format!(
        "{prefix} Hola! {FOLLOWUP_MARKER}{uid}], ¿ya se concretó (arriendo/venta/compra)? Responde \"Sí\" o \"No\"."
    )
}

/// Broker phone cell → WhatsApp JID (digits only).
fn broker_jid(broker_phone: &str) -> String {
    let digits: String = broker_phone
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    format!("{digits}@s.whatsapp.net")
}

impl super::Gateway {
    /// One tick of the follow-up loop: resolve the target sheet and run.
    pub(super) async fn followup_tick(&self) {
        let Some(ref runner) = self.followup else {
            return;
        };

        let (sheet_id, tab) = match self.resolve_target_sheet().await {
            Ok(target) => target,
            Err(e) => {
                error!("follow-up: cannot resolve target sheet: {e}");
                return;
            }
        };

        let now = Local::now();
        let stats = runner
            .run(
                &sheet_id,
                &tab,
                now.date_naive(),
                &now.format("%Y-%m-%d %H:%M:%S").to_string(),
            )
            .await;

        if stats.errors > 0 {
            self.notifier
                .alert(&format!(
                    "seguimientos con errores: {} de {} envíos fallaron",
                    stats.errors,
                    stats.sent + stats.errors
                ))
                .await;
        }
    }
}
