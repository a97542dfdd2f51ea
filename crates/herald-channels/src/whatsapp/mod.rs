//! WhatsApp transport via a WhatsApp Web bridge.
//!
//! The bridge is a separate process that owns the browser session and
//! QR pairing. Herald polls its `/status` endpoint and posts outgoing
//! messages to `/messages`.

mod channel;
mod qr;
mod send;
mod types;
mod watch;


pub use qr::generate_qr_terminal;
pub use types::BridgeStatus;

use herald_core::config::WhatsAppConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// WhatsApp transport backed by the bridge HTTP API.
#[derive(Clone)]
pub struct WhatsAppBridge {
    pub(super) config: WhatsAppConfig,
    pub(super) client: reqwest::Client,
    pub(super) base_url: String,
    /// Last status reported by the bridge. Not ready until the first refresh.
    pub(super) status: Arc<Mutex<BridgeStatus>>,
}

impl WhatsAppBridge {
    /// Create a new bridge transport from config.
    pub fn new(config: WhatsAppConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_default();
        let base_url = config.bridge_url.trim_end_matches('/').to_string();
        Self {
            config,
            client,
            base_url,
            status: Arc::new(Mutex::new(BridgeStatus::default())),
        }
    }

    /// The last status seen, without contacting the bridge.
    pub async fn cached_status(&self) -> BridgeStatus {
        self.status.lock().await.clone()
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.config.api_token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.config.api_token)
        }
    }
}
