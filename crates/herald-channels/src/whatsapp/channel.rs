//! MessageTransport implementation for the WhatsApp bridge.

use super::WhatsAppBridge;
use async_trait::async_trait;
use herald_core::{error::HeraldError, traits::MessageTransport};

#[async_trait]
impl MessageTransport for WhatsAppBridge {
    fn name(&self) -> &str {
        "whatsapp"
    }

    fn chat_suffix(&self) -> &str {
        &self.config.chat_suffix
    }

    async fn is_ready(&self) -> bool {
        self.status.lock().await.ready
    }

    async fn needs_authentication(&self) -> bool {
        self.status.lock().await.needs_authentication()
    }

    async fn send(&self, chat_address: &str, body: &str) -> Result<(), HeraldError> {
        self.send_text(chat_address, body).await
    }
}
