//! One-off delivery to a single phone number.
//!
//! Independent of the bulk controller: nothing here reads or writes bulk
//! job state, and a failure is reported only to the caller.

use crate::bulk::deliver_with_timeout;
use herald_core::{phone::chat_address, render, traits::MessageTransport};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Greeting used for `{name}` when no contact name is given.
pub const DEFAULT_GREETING_NAME: &str = "there";

/// Result of a single send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleSendOutcome {
    pub success: bool,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SingleSendRejection {
    #[error("WhatsApp client not ready")]
    TransportNotReady,
    #[error("Phone and message are required")]
    MissingInput,
}

/// Send `message` to `phone` right away.
///
/// Only `{name}` is substituted, with `contact_name` or
/// [`DEFAULT_GREETING_NAME`]. A delivery failure is an `Ok` outcome with
/// `success == false`; only precondition failures are `Err`.
pub async fn send_single(
    transport: &dyn MessageTransport,
    phone: &str,
    message: &str,
    contact_name: Option<&str>,
    timeout: Duration,
) -> Result<SingleSendOutcome, SingleSendRejection> {
    if !transport.is_ready().await {
        return Err(SingleSendRejection::TransportNotReady);
    }
    let phone = phone.trim();
    if phone.is_empty() || message.is_empty() {
        return Err(SingleSendRejection::MissingInput);
    }

    let name = contact_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_GREETING_NAME);
    let body = render::render(message, &HashMap::from([(render::NAME, name.to_string())]));
    let address = chat_address(phone, transport.chat_suffix());

    match deliver_with_timeout(transport, &address, &body, timeout).await {
        Ok(()) => {
            info!("message sent to {phone}");
            Ok(SingleSendOutcome {
                success: true,
                phone: phone.to_string(),
                error: None,
            })
        }
        Err(e) => {
            warn!("failed to send to {phone}: {e}");
            Ok(SingleSendOutcome {
                success: false,
                phone: phone.to_string(),
                error: Some(e),
            })
        }
    }
}
