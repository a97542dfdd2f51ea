//! Bridge API wire types.

use serde::{Deserialize, Serialize};

/// Session state reported by `GET /status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeStatus {
    #[serde(default)]
    pub ready: bool,
    /// Pending pairing QR payload, present until the session is authenticated.
    #[serde(default)]
    pub qr: Option<String>,
}

impl BridgeStatus {
    pub fn needs_authentication(&self) -> bool {
        !self.ready && self.qr.is_some()
    }
}

/// Body of `POST /messages`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SendRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
}

/// Error body returned by the bridge on failure.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorResponse {
    pub error: String,
}
