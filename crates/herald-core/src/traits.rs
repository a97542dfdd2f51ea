use crate::error::HeraldError;
use async_trait::async_trait;

/// Outbound message delivery, as seen by the bulk and single-send paths.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Human-readable transport name.
    fn name(&self) -> &str;

    /// Suffix appended to a phone number to form a chat address.
    fn chat_suffix(&self) -> &str;

    /// Whether the transport can deliver messages right now.
    async fn is_ready(&self) -> bool;

    /// Whether the session is waiting for the user to authenticate (scan a QR).
    async fn needs_authentication(&self) -> bool {
        false
    }

    /// Deliver `body` to `chat_address`.
    async fn send(&self, chat_address: &str, body: &str) -> Result<(), HeraldError>;
}
