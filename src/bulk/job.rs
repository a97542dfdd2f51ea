//! Bulk send job state and the snapshot served to pollers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub const CONTACT_NOT_FOUND: &str = "Contact not found";

/// Outcome of one contact in a bulk run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub contact_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendResult {
    pub fn delivered(contact_id: u32, name: &str, phone: &str) -> Self {
        Self {
            contact_id,
            name: Some(name.to_string()),
            phone: Some(phone.to_string()),
            success: true,
            error: None,
        }
    }

    pub fn failed(contact_id: u32, name: &str, phone: &str, error: String) -> Self {
        Self {
            contact_id,
            name: Some(name.to_string()),
            phone: Some(phone.to_string()),
            success: false,
            error: Some(error),
        }
    }

    pub fn not_found(contact_id: u32) -> Self {
        Self {
            contact_id,
            name: None,
            phone: None,
            success: false,
            error: Some(CONTACT_NOT_FOUND.to_string()),
        }
    }
}

/// The contact currently being delivered to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentContact {
    pub name: String,
    pub phone: String,
}

/// Progress of the current (or most recent) bulk run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSendJob {
    pub job_id: Option<Uuid>,
    pub is_running: bool,
    pub total: usize,
    /// Contacts processed so far, successful or not. Always `results.len()`.
    pub sent: usize,
    pub current_contact: Option<CurrentContact>,
    pub results: Vec<SendResult>,
    /// Milliseconds until the next send attempt.
    pub next_send_in: u64,
    pub cancelled: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BulkSendJob {
    /// A fresh running job for `total` contacts.
    pub fn start(job_id: Uuid, total: usize) -> Self {
        Self {
            job_id: Some(job_id),
            is_running: true,
            total,
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Append a result. `sent` tracks `results` one for one.
    pub fn record(&mut self, result: SendResult) {
        if self.results.len() < self.total {
            self.results.push(result);
            self.sent = self.results.len();
        }
    }

    /// Terminal transition: clear transient fields and stamp the end time.
    pub fn finish(&mut self) {
        if self.is_running {
            self.finished_at = Some(Utc::now());
        }
        self.is_running = false;
        self.current_contact = None;
        self.next_send_in = 0;
    }
}

/// Why a bulk request (or cancel) was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BulkRejection {
    #[error("WhatsApp client not ready")]
    TransportNotReady,
    #[error("Contact IDs are required")]
    NoContacts,
    #[error("Message is required")]
    EmptyTemplate,
    #[error("A bulk send is already in progress")]
    AlreadyRunning,
    #[error("No bulk send is running")]
    NotRunning,
}
