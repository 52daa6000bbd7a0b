//! Per-message dispatch: follow-up replies, commands, then free text.

use super::Gateway;
use crate::commands;
use corredor_core::message::IncomingMessage;
use corredor_memory::audit::{AuditEntry, AuditStatus};
use tracing::{info, warn};

impl Gateway {
    /// Process a single incoming message through the full dispatch policy.
    pub(super) async fn handle_message(&self, incoming: IncomingMessage) {
        let preview = if incoming.text.chars().count() > 60 {
            let truncated: String = incoming.text.chars().take(60).collect();
            format!("{truncated}...")
        } else {
            incoming.text.clone()
        };
        info!(
            "[{}] {} says: {}",
            incoming.channel,
            incoming.sender_name.as_deref().unwrap_or("unknown"),
            preview
        );

        // --- 1. AUTH CHECK ---
        // Direct chats only: listings arriving from open broker groups are
        // logged regardless of the allowlist, and groups never get replies.
        if self.auth.enabled
            && !incoming.is_group
            && !self.allowed_users.is_empty()
            && !self.allowed_users.contains(&incoming.sender_id)
        {
            warn!(
                "auth denied for {} on {}",
                incoming.sender_id, incoming.channel
            );
            let _ = self
                .audit
                .log(&AuditEntry {
                    channel: incoming.channel.clone(),
                    sender_id: incoming.sender_id.clone(),
                    sender_name: incoming.sender_name.clone(),
                    input_text: incoming.text.clone(),
                    status: AuditStatus::Denied,
                    saved_rows: None,
                    detail: Some("sender not in allowlist".into()),
                    processing_ms: None,
                })
                .await;
            self.send_text(&incoming, &self.auth.deny_message).await;
            return;
        }

        // --- 2. FOLLOW-UP REPLY ---
        // A reply quoting one of our follow-up messages short-circuits
        // everything else.
        if let Some(quoted) = incoming.quoted.as_ref().filter(|q| q.from_me) {
            if let Some(uid) = super::reply::parse_followup_uid(&quoted.text) {
                self.handle_followup_reply(&incoming, &uid).await;
                return;
            }
        }

        // --- 3. COMMANDS ---
        if let Some(cmd) = commands::Command::parse(&incoming.text) {
            if incoming.is_group {
                // Commands are a direct-chat surface; group chatter with a
                // slash prefix is noise.
                let _ = self
                    .audit
                    .log(&AuditEntry {
                        channel: incoming.channel.clone(),
                        sender_id: incoming.sender_id.clone(),
                        sender_name: incoming.sender_name.clone(),
                        input_text: incoming.text.clone(),
                        status: AuditStatus::Ignored,
                        saved_rows: None,
                        detail: Some("command in group chat".into()),
                        processing_ms: None,
                    })
                    .await;
                return;
            }

            match cmd {
                commands::Command::Buscar => self.handle_search(&incoming).await,
                commands::Command::Menu | commands::Command::Ayuda => {
                    self.send_text(&incoming, commands::help_text()).await;
                }
            }
            return;
        }

        // --- 4. FREE TEXT → EXTRACTION PIPELINE ---
        self.handle_intake(incoming).await;
    }

    /// Handle a `/buscar` query against the property log.
    async fn handle_search(&self, incoming: &IncomingMessage) {
        let query = commands::search::parse_search_query(&incoming.text);

        let Some(query) = query else {
            self.send_text(
                incoming,
                "No entendí tu búsqueda. Prueba por ejemplo: /buscar departamento en arriendo en Providencia",
            )
            .await;
            return;
        };

        if !query.is_searchable() {
            self.send_text(incoming, &commands::search::missing_criteria_reply(&query))
                .await;
            return;
        }

        let (sheet_id, tab) = match self.resolve_target_sheet().await {
            Ok(target) => target,
            Err(e) => {
                warn!("search: {e}");
                self.send_text(
                    incoming,
                    "Error: no estoy configurado para buscar propiedades en este momento.",
                )
                .await;
                return;
            }
        };

        match self.sheets.rows_with_index(&sheet_id, &tab).await {
            Ok(rows) => {
                let matches = commands::search::search_rows(&rows, &query);
                self.send_text(incoming, &commands::search::format_results(&matches, &query))
                    .await;
            }
            Err(e) => {
                warn!("search: failed to read sheet: {e}");
                self.send_text(incoming, "Hubo un error al buscar. Intenta más tarde.")
                    .await;
            }
        }
    }
}
