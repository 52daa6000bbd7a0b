//! Handling replies to follow-up messages.
//!
//! Follow-ups quote the listing UID in a fixed phrase; when a broker
//! replies to one of those messages, the quoted text carries the marker
//! and UID that correlate the answer back to a row.

use super::followup::FOLLOWUP_MARKER;
use super::Gateway;
use corredor_core::message::IncomingMessage;
use corredor_memory::audit::{AuditEntry, AuditStatus};
use corredor_sheets::Column;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{error, info};

const AFFIRMATIVE: &[&str] = &[
    "si",
    "sí",
    "listo",
    "vendido",
    "arrendado",
    "conseguido",
    "ya",
    "ok",
];

const NEGATIVE: &[&str] = &[
    "no",
    "aún no",
    "aun no",
    "todavía",
    "todavia",
    "sigue disponible",
    "sigue",
];

/// Extract the listing UID from a quoted follow-up message.
///
/// Returns `None` when the text is not one of our follow-ups (no marker)
/// or carries no parseable UID.
pub(super) fn parse_followup_uid(quoted_text: &str) -> Option<String> {
    if !quoted_text.contains(FOLLOWUP_MARKER) {
        return None;
    }
    static UID_RE: OnceLock<Regex> = OnceLock::new();
    let re = UID_RE.get_or_init(|| Regex::new(r"ID \[([^\]\s]+)\]").unwrap());
    re.captures(quoted_text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// How a reply to a follow-up reads.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum ReplyKind {
    Affirmative,
    Negative,
    Unrecognized,
}

pub(super) fn classify_reply(text: &str) -> ReplyKind {
    let normalized = text.trim().to_lowercase();
    if AFFIRMATIVE.contains(&normalized.as_str()) {
        ReplyKind::Affirmative
    } else if NEGATIVE.contains(&normalized.as_str()) {
        ReplyKind::Negative
    } else {
        ReplyKind::Unrecognized
    }
}

impl Gateway {
    /// Process a reply that quotes a follow-up for listing `uid`.
    pub(super) async fn handle_followup_reply(&self, incoming: &IncomingMessage, uid: &str) {
        let kind = classify_reply(&incoming.text);
        info!(
            "follow-up reply for {uid} from {}: {:?}",
            incoming.sender_id, kind
        );

        match kind {
            ReplyKind::Affirmative => {
                let closed = self.close_listing(uid).await;
                if !incoming.is_group {
                    let reply = if closed {
                        "¡Excelente! He actualizado el estado de tu publicación."
                    } else {
                        "Gracias por confirmar. Hubo un problema al actualizar el registro, lo revisaremos."
                    };
                    self.send_text(incoming, reply).await;
                }
                let _ = self
                    .audit
                    .log(&AuditEntry {
                        channel: incoming.channel.clone(),
                        sender_id: incoming.sender_id.clone(),
                        sender_name: incoming.sender_name.clone(),
                        input_text: incoming.text.clone(),
                        status: if closed {
                            AuditStatus::Ok
                        } else {
                            AuditStatus::Error
                        },
                        saved_rows: None,
                        detail: Some(format!("follow-up close for {uid}")),
                        processing_ms: None,
                    })
                    .await;
            }
            ReplyKind::Negative => {
                if !incoming.is_group {
                    self.send_text(
                        incoming,
                        "Entendido, lo mantendremos activo. ¡Gracias por confirmar!",
                    )
                    .await;
                }
            }
            ReplyKind::Unrecognized => {
                if !incoming.is_group {
                    self.send_text(
                        incoming,
                        "Disculpa, no entendí bien tu respuesta. ¿Se concretó lo de tu publicación (sí/no)?",
                    )
                    .await;
                }
            }
        }
    }

    /// Mark the row for `uid` as terminally closed. Returns whether the
    /// update went through.
    async fn close_listing(&self, uid: &str) -> bool {
        let (sheet_id, tab) = match self.resolve_target_sheet().await {
            Ok(target) => target,
            Err(e) => {
                error!("follow-up close: {e}");
                self.notifier
                    .alert(&format!("no se pudo cerrar {uid}: planilla no configurada"))
                    .await;
                return false;
            }
        };

        match self
            .sheets
            .update_cells_by_uid(
                &sheet_id,
                &tab,
                uid,
                &[(Column::Status, "Cerrado".to_string())],
            )
            .await
        {
            Ok(()) => {
                info!("listing {uid} closed by sender confirmation");
                true
            }
            Err(e) => {
                error!("follow-up close failed for {uid}: {e}");
                self.notifier
                    .alert(&format!("error al cerrar la publicación {uid}: {e}"))
                    .await;
                false
            }
        }
    }
}
