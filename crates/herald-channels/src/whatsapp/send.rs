//! Bridge HTTP calls: status refresh and message delivery.

use super::types::{BridgeStatus, ErrorResponse, SendRequest};
use super::WhatsAppBridge;
use herald_core::error::HeraldError;
use tracing::debug;

impl WhatsAppBridge {
    /// Fetch `/status` from the bridge and update the cache.
    ///
    /// An unreachable bridge is cached as not ready.
    pub async fn refresh_status(&self) -> Result<BridgeStatus, HeraldError> {
        let result = self.fetch_status().await;
        let mut cached = self.status.lock().await;
        match result {
            Ok(status) => {
                *cached = status.clone();
                Ok(status)
            }
            Err(e) => {
                cached.ready = false;
                Err(e)
            }
        }
    }

    async fn fetch_status(&self) -> Result<BridgeStatus, HeraldError> {
        let url = format!("{}/status", self.base_url);
        let resp = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| HeraldError::Transport(format!("bridge status request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(HeraldError::Transport(format!(
                "bridge status error {status}: {body}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| HeraldError::Transport(format!("bridge status parse failed: {e}")))
    }

    /// Post a text message to a chat address (phone@c.us).
    pub(super) async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), HeraldError> {
        let url = format!("{}/messages", self.base_url);
        let resp = self
            .with_auth(self.client.post(&url))
            .json(&SendRequest { chat_id, text })
            .send()
            .await
            .map_err(|e| HeraldError::Transport(format!("whatsapp send failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(HeraldError::Transport(format!(
                "whatsapp send rejected ({status}): {reason}"
            )));
        }

        debug!("whatsapp message delivered to {chat_id}");
        Ok(())
    }
}
