//! Long-polling loop and Channel trait implementation.

use super::types::{BridgeResponse, PollBody, SendRequest};
use super::WhatsAppChannel;
use async_trait::async_trait;
use corredor_core::{
    error::CorredorError,
    message::{IncomingMessage, OutgoingMessage, QuotedMessage},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

#[async_trait]
impl Channel for WhatsAppChannel {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, CorredorError> {
        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.config.bridge_url.trim_end_matches('/').to_string();
        let api_token = self.config.api_token.clone();
        let cursor = self.cursor.clone();

        info!("WhatsApp channel starting long polling against {base_url}");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let after = *cursor.lock().await;

                let mut url = format!("{base_url}/api/poll?timeout=30");
                if let Some(after) = after {
                    url.push_str(&format!("&after={after}"));
                }

                let mut request = client
                    .get(&url)
                    .timeout(std::time::Duration::from_secs(35));
                if !api_token.is_empty() {
                    request = request.bearer_auth(&api_token);
                }

                let resp = match request.send().await {
                    Ok(r) => r,
                    Err(e) => {
                        error!("whatsapp poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: BridgeResponse<PollBody> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("whatsapp poll parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "whatsapp bridge error (retry in {backoff_secs}s): {}",
                        body.error.unwrap_or_default()
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                // Successful poll -- reset backoff.
                backoff_secs = 1;

                let Some(poll) = body.body else { continue };

                if let Some(next) = poll.cursor {
                    *cursor.lock().await = Some(next);
                }

                for msg in poll.messages {
                    // Skip our own echo.
                    if msg.from_me {
                        debug!("whatsapp: skipping own message {}", msg.id);
                        continue;
                    }
                    if msg.body.trim().is_empty() {
                        continue;
                    }

                    let incoming = IncomingMessage {
                        id: Uuid::new_v4(),
                        channel: "whatsapp".to_string(),
                        sender_id: msg.sender.clone(),
                        sender_name: msg.push_name.clone(),
                        text: msg.body.trim().to_string(),
                        timestamp: chrono::Utc::now(),
                        quoted: msg.quoted.map(|q| QuotedMessage {
                            text: q.body,
                            from_me: q.from_me,
                        }),
                        reply_target: Some(msg.chat_id.clone()),
                        is_group: msg.is_group,
                    };

                    if tx.send(incoming).await.is_err() {
                        info!("whatsapp channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), CorredorError> {
        let target = message
            .reply_target
            .as_deref()
            .ok_or_else(|| CorredorError::Channel("no reply_target on outgoing message".into()))?;

        let base_url = self.config.bridge_url.trim_end_matches('/');
        let url = format!("{base_url}/api/send");

        for chunk in super::send::split_message(&message.text, 4096) {
            let mut request = self.client.post(&url).json(&SendRequest {
                to: target,
                text: chunk,
            });
            if !self.config.api_token.is_empty() {
                request = request.bearer_auth(&self.config.api_token);
            }

            let resp = request
                .send()
                .await
                .map_err(|e| CorredorError::Channel(format!("whatsapp send failed: {e}")))?;

            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(CorredorError::Channel(format!(
                    "whatsapp bridge returned {status}: {text}"
                )));
            }
        }

        Ok(())
    }

    async fn stop(&self) -> Result<(), CorredorError> {
        info!("WhatsApp channel stopped");
        Ok(())
    }
}
