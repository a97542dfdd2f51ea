//! Background status polling and pairing output.

use super::qr::generate_qr_terminal;
use super::types::BridgeStatus;
use super::WhatsAppBridge;
use std::time::Duration;
use tracing::{info, warn};

/// What changed between two status observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum StatusChange {
    NewQr(String),
    Ready,
    Disconnected,
}

pub(super) fn diff_status(previous: &BridgeStatus, current: &BridgeStatus) -> Vec<StatusChange> {
    let mut changes = Vec::new();
    if let Some(qr) = &current.qr {
        if previous.qr.as_ref() != Some(qr) && !current.ready {
            changes.push(StatusChange::NewQr(qr.clone()));
        }
    }
    match (previous.ready, current.ready) {
        (false, true) => changes.push(StatusChange::Ready),
        (true, false) => changes.push(StatusChange::Disconnected),
        _ => {}
    }
    changes
}

fn print_qr(qr: &str) {
    match generate_qr_terminal(qr) {
        Ok(rendered) => println!("\nScan this QR code with your WhatsApp app:\n\n{rendered}"),
        Err(e) => warn!("failed to render pairing QR: {e}"),
    }
}

impl WhatsAppBridge {
    /// Poll the bridge forever, logging readiness changes and printing
    /// each new pairing QR to the terminal.
    pub async fn watch_status(self) {
        let interval = Duration::from_secs(self.config.status_poll_secs.max(1));
        let mut previous = BridgeStatus::default();
        let mut reachable = true;

        loop {
            match self.refresh_status().await {
                Ok(current) => {
                    if !reachable {
                        info!("whatsapp bridge reachable again at {}", self.base_url);
                        reachable = true;
                    }
                    for change in diff_status(&previous, &current) {
                        match change {
                            StatusChange::NewQr(qr) => {
                                info!("WhatsApp QR code generated (scan to pair)");
                                print_qr(&qr);
                            }
                            StatusChange::Ready => info!("WhatsApp client is ready"),
                            StatusChange::Disconnected => warn!("WhatsApp client disconnected"),
                        }
                    }
                    previous = current;
                }
                Err(e) => {
                    if reachable {
                        warn!("whatsapp bridge unreachable: {e}");
                        reachable = false;
                    }
                    if previous.ready {
                        warn!("WhatsApp client disconnected");
                    }
                    previous = BridgeStatus::default();
                }
            }

            tokio::time::sleep(interval).await;
        }
    }

    /// Poll until the session is ready, printing every new QR.
    ///
    /// Returns once the bridge reports `ready`. Bridge errors are logged
    /// and retried.
    pub async fn wait_until_paired(&self) {
        let interval = Duration::from_secs(self.config.status_poll_secs.max(1));
        let mut previous = BridgeStatus::default();

        loop {
            match self.refresh_status().await {
                Ok(current) => {
                    for change in diff_status(&previous, &current) {
                        if let StatusChange::NewQr(qr) = change {
                            print_qr(&qr);
                        }
                    }
                    if current.ready {
                        info!("WhatsApp client is ready");
                        return;
                    }
                    previous = current;
                }
                Err(e) => warn!("waiting for whatsapp bridge: {e}"),
            }

            tokio::time::sleep(interval).await;
        }
    }
}
