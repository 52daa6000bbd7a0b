//! Free-text intake: extract → split → map → append.

use super::Gateway;
use chrono::Local;
use corredor_core::message::IncomingMessage;
use corredor_memory::audit::{AuditEntry, AuditStatus};
use corredor_sheets::row::to_row;
use std::time::Instant;
use tracing::{error, info};

impl Gateway {
    /// Run the extraction pipeline for a free-text message and persist the
    /// results. Direct chats get acknowledgments; groups are write-only.
    pub(super) async fn handle_intake(&self, incoming: IncomingMessage) {
        let started = Instant::now();

        if !incoming.is_group {
            self.send_text(&incoming, "Procesando tu publicación, un momento por favor...")
                .await;
        }

        let records = self.extractor.extract(&incoming.text).await;

        if records.is_empty() {
            if incoming.is_group {
                self.audit_intake(&incoming, AuditStatus::Ignored, None, Some("no listings"), started)
                    .await;
                return;
            }
            // No extractable listing in a direct chat: treat the message as
            // a question about the logged properties.
            let answer = self.answer_query(&incoming.text).await;
            self.send_text(&incoming, &answer).await;
            self.audit_intake(&incoming, AuditStatus::Ok, None, Some("generic query"), started)
                .await;
            return;
        }

        // One extracted record may still encode several listings.
        let listings: Vec<_> = records
            .iter()
            .flat_map(|record| self.splitter.maybe_split(record))
            .collect();
        info!(
            "extracted {} record(s), {} after splitting",
            records.len(),
            listings.len()
        );

        let (sheet_id, tab) = match self.resolve_target_sheet().await {
            Ok(target) => target,
            Err(e) => {
                error!("intake: {e}");
                if !incoming.is_group {
                    self.send_text(
                        &incoming,
                        "No se pudo guardar la información: no hay planilla configurada. Contacta al administrador.",
                    )
                    .await;
                }
                self.notifier
                    .alert("intake falló: no hay planilla designada configurada")
                    .await;
                self.audit_intake(&incoming, AuditStatus::Error, None, Some("no sheet"), started)
                    .await;
                return;
            }
        };

        let sender_name = incoming.sender_name.clone().unwrap_or_default();
        let now = Local::now();
        let rows: Vec<Vec<String>> = listings
            .iter()
            .map(|listing| to_row(listing, &sender_name, &incoming.sender_id, now))
            .collect();

        match self.sheets.append_rows(&sheet_id, &tab, &rows).await {
            Ok(saved) => {
                info!("saved {saved} listing(s) from {}", incoming.sender_id);
                if !incoming.is_group {
                    let reply = if saved == 1 {
                        "¡Listo! Se guardó 1 propiedad en la planilla.".to_string()
                    } else {
                        format!("¡Listo! Se guardaron {saved} propiedades en la planilla.")
                    };
                    self.send_text(&incoming, &reply).await;
                }
                self.audit_intake(&incoming, AuditStatus::Ok, Some(saved as i64), None, started)
                    .await;
            }
            Err(e) => {
                error!("intake: failed to append rows: {e}");
                if !incoming.is_group {
                    self.send_text(
                        &incoming,
                        "Lo siento, ocurrió un error al guardar tu publicación. Ya estamos trabajando en ello.",
                    )
                    .await;
                }
                self.notifier
                    .alert(&format!("error al agregar filas a la planilla: {e}"))
                    .await;
                self.audit_intake(
                    &incoming,
                    AuditStatus::Error,
                    None,
                    Some(&e.to_string()),
                    started,
                )
                .await;
            }
        }
    }

    async fn audit_intake(
        &self,
        incoming: &IncomingMessage,
        status: AuditStatus,
        saved_rows: Option<i64>,
        detail: Option<&str>,
        started: Instant,
    ) {
        let result = self
            .audit
            .log(&AuditEntry {
                channel: incoming.channel.clone(),
                sender_id: incoming.sender_id.clone(),
                sender_name: incoming.sender_name.clone(),
                input_text: incoming.text.clone(),
                status,
                saved_rows,
                detail: detail.map(String::from),
                processing_ms: Some(started.elapsed().as_millis() as i64),
            })
            .await;
        if let Err(e) = result {
            error!("audit log failed: {e}");
        }
    }
}
