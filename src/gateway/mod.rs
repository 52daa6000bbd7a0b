//! Gateway — the main event loop connecting the channel, the extraction
//! pipeline, the sheet store, and the follow-up scheduler.
//!
//! Includes: auth enforcement, audit logging, and graceful shutdown.

mod followup;
mod intake;
mod pipeline;
mod query;
mod reply;

pub(crate) use followup::FollowUpRunner;

use crate::notify::Notifier;
use corredor_core::{
    config::{AuthConfig, Config, FollowUpConfig, SheetsConfig},
    error::CorredorError,
    message::{IncomingMessage, OutgoingMessage},
    traits::{Channel, Provider},
};
use corredor_extract::{split::Splitter, Extractor};
use corredor_memory::{AuditLogger, Store};
use corredor_sheets::SheetStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// The central gateway that routes messages between the channel and the
/// extraction/persistence pipeline.
pub struct Gateway {
    pub(super) provider: Arc<dyn Provider>,
    pub(super) channels: HashMap<String, Arc<dyn Channel>>,
    pub(super) store: Store,
    pub(super) sheets: Arc<dyn SheetStore>,
    pub(super) audit: AuditLogger,
    pub(super) extractor: Extractor,
    pub(super) splitter: Splitter,
    pub(super) notifier: Notifier,
    pub(super) auth: AuthConfig,
    /// Allowed direct-chat senders (from the channel config). Empty = all.
    pub(super) allowed_users: Vec<String>,
    pub(super) sheets_cfg: SheetsConfig,
    pub(super) followup_cfg: FollowUpConfig,
    /// Present when a channel exists to deliver follow-ups through.
    pub(super) followup: Option<FollowUpRunner>,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        provider: Arc<dyn Provider>,
        channels: HashMap<String, Arc<dyn Channel>>,
        store: Store,
        sheets: Arc<dyn SheetStore>,
        cfg: &Config,
    ) -> Self {
        let audit = AuditLogger::new(store.pool().clone());
        let extractor = Extractor::new(provider.clone(), &cfg.extract);
        let whatsapp = channels.get("whatsapp").cloned();
        let notifier = Notifier::new(
            whatsapp.clone(),
            store.clone(),
            cfg.notify.admin_phone.clone(),
        );
        let followup = whatsapp.map(|ch| FollowUpRunner::new(sheets.clone(), ch));
        let allowed_users = cfg
            .channel
            .whatsapp
            .as_ref()
            .map(|wa| wa.allowed_users.clone())
            .unwrap_or_default();

        Self {
            provider,
            channels,
            store,
            sheets,
            audit,
            extractor,
            splitter: Splitter::new(),
            notifier,
            auth: cfg.auth.clone(),
            allowed_users,
            sheets_cfg: cfg.sheets.clone(),
            followup_cfg: cfg.followup.clone(),
            followup,
        }
    }

    /// Run the main event loop.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Corredor gateway running | provider: {} | channels: {} | auth: {}",
            self.provider.name(),
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
            if self.auth.enabled {
                "enforced"
            } else {
                "disabled"
            },
        );

        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("gateway receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        // Spawn the follow-up loop.
        let followup_handle = if self.followup_cfg.enabled && self.followup.is_some() {
            let gw = self.clone();
            let poll_secs = self.followup_cfg.poll_interval_secs;
            Some(tokio::spawn(async move {
                loop {
                    tokio::time::sleep(std::time::Duration::from_secs(poll_secs)).await;
                    gw.followup_tick().await;
                }
            }))
        } else {
            if self.followup_cfg.enabled {
                warn!("follow-up scheduler enabled but no channel to send through");
            }
            None
        };

        // Main event loop with graceful shutdown.
        loop {
            tokio::select! {
                Some(incoming) = rx.recv() => {
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.handle_message(incoming).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        // Graceful shutdown.
        if let Some(handle) = followup_handle {
            handle.abort();
        }
        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("failed to stop channel {name}: {e}");
            }
        }
        info!("Shutdown complete.");
        Ok(())
    }

    /// Send a plain text message back to the sender.
    pub(super) async fn send_text(&self, incoming: &IncomingMessage, text: &str) {
        let msg = OutgoingMessage::reply_to(incoming, text);

        if let Some(channel) = self.channels.get(&incoming.channel) {
            if let Err(e) = channel.send(msg).await {
                error!("failed to send message: {e}");
            }
        } else {
            error!("no channel found for '{}'", incoming.channel);
        }
    }

    /// Resolve the spreadsheet and tab that listings go to.
    ///
    /// The designated sheet from the local database wins; the config
    /// fallback applies when none is flagged. Missing both is an error for
    /// the current operation only.
    pub(super) async fn resolve_target_sheet(&self) -> Result<(String, String), CorredorError> {
        let sheet_id = match self.store.designated_sheet().await? {
            Some(sheet) => sheet.sheet_id,
            None if !self.sheets_cfg.fallback_sheet_id.is_empty() => {
                self.sheets_cfg.fallback_sheet_id.clone()
            }
            None => {
                return Err(CorredorError::Config(
                    "no designated property log sheet configured".into(),
                ))
            }
        };

        let tab = match self.sheets.first_tab_title(&sheet_id).await {
            Ok(title) => title,
            Err(e) => {
                warn!("failed to resolve first tab of {sheet_id}: {e}, using configured tab");
                self.sheets_cfg.fallback_tab.clone()
            }
        };

        Ok((sheet_id, tab))
    }
}
