//! Bulk send controller: one rate-limited background job at a time.
//!
//! `submit` validates the request, resets the shared job state and spawns
//! the processing task. The task walks the contact ids in order: resolve,
//! render, deliver, record, then wait a random 5–12 s before the next one.
//! `progress` and `cancel` only touch the state under a short lock, so they
//! are safe to call from any request handler while the job runs.

mod cancel;
mod delay;
mod job;


pub use cancel::CancellationToken;
pub use delay::{DelayScheduler, WaitOutcome};
pub use job::{BulkRejection, BulkSendJob, CurrentContact, SendResult};

use herald_core::{
    config::BulkConfig, contact::ContactStore, phone::chat_address, render,
    traits::MessageTransport,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Acknowledgement for an accepted bulk request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accepted {
    pub job_id: Uuid,
    pub total: usize,
}

/// Shared handle to the bulk send controller.
#[derive(Clone)]
pub struct BulkSender {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn MessageTransport>,
    contacts: Arc<ContactStore>,
    delay: DelayScheduler,
    send_timeout: Duration,
    fallback_name: String,
    state: Mutex<JobState>,
}

#[derive(Default)]
struct JobState {
    job: BulkSendJob,
    cancel: Option<CancellationToken>,
}

impl BulkSender {
    pub fn new(
        transport: Arc<dyn MessageTransport>,
        contacts: Arc<ContactStore>,
        config: &BulkConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                contacts,
                delay: DelayScheduler::from_config(config),
                send_timeout: config.send_timeout(),
                fallback_name: config.fallback_name.clone(),
                state: Mutex::new(JobState::default()),
            }),
        }
    }

    pub fn transport(&self) -> &Arc<dyn MessageTransport> {
        &self.inner.transport
    }

    pub fn contacts(&self) -> &ContactStore {
        &self.inner.contacts
    }

    pub fn send_timeout(&self) -> Duration {
        self.inner.send_timeout
    }

    /// Start a bulk run, or say why not. Returns as soon as the job is spawned.
    ///
    /// A request while a job is running is rejected, never queued, and
    /// leaves the running job untouched.
    pub async fn submit(
        &self,
        contact_ids: Vec<u32>,
        template: String,
    ) -> Result<Accepted, BulkRejection> {
        if !self.inner.transport.is_ready().await {
            return Err(BulkRejection::TransportNotReady);
        }
        if contact_ids.is_empty() {
            return Err(BulkRejection::NoContacts);
        }
        if template.trim().is_empty() {
            return Err(BulkRejection::EmptyTemplate);
        }

        let job_id = Uuid::new_v4();
        let total = contact_ids.len();
        let cancel = CancellationToken::new();
        {
            let mut state = self.inner.state.lock();
            if state.job.is_running {
                return Err(BulkRejection::AlreadyRunning);
            }
            state.job = BulkSendJob::start(job_id, total);
            state.cancel = Some(cancel.clone());
        }

        info!("bulk send {job_id} accepted: {total} contacts");

        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let _finish = FinishGuard {
                inner: Arc::clone(&inner),
                job_id,
            };
            inner.process(job_id, contact_ids, template, cancel).await;
        });

        // The guard has already finalized the state; this only reports.
        tokio::spawn(async move {
            if let Err(e) = handle.await {
                error!("bulk send {job_id} task failed: {e}");
            }
        });

        Ok(Accepted { job_id, total })
    }

    /// Ask the running job to stop. Takes effect before the next contact
    /// or immediately if the job is waiting between messages; a send
    /// already in flight is allowed to finish.
    pub fn cancel(&self) -> Result<(), BulkRejection> {
        let mut state = self.inner.state.lock();
        if !state.job.is_running {
            return Err(BulkRejection::NotRunning);
        }
        state.job.cancelled = true;
        if let Some(token) = &state.cancel {
            token.cancel();
        }
        info!(
            "bulk send cancellation requested after {}/{} contacts",
            state.job.sent, state.job.total
        );
        Ok(())
    }

    /// Consistent snapshot of the current or most recent job.
    pub fn progress(&self) -> BulkSendJob {
        self.inner.state.lock().job.clone()
    }
}

impl Inner {
    fn update(&self, f: impl FnOnce(&mut BulkSendJob)) {
        f(&mut self.state.lock().job);
    }

    async fn process(
        &self,
        job_id: Uuid,
        contact_ids: Vec<u32>,
        template: String,
        cancel: CancellationToken,
    ) {
        let total = contact_ids.len();

        for (index, &contact_id) in contact_ids.iter().enumerate() {
            if cancel.is_cancelled() {
                break;
            }

            let Some(contact) = self.contacts.get(contact_id) else {
                warn!("bulk send {job_id}: contact {contact_id} not found");
                self.update(|job| job.record(SendResult::not_found(contact_id)));
                continue;
            };

            let name = contact.name_or(&self.fallback_name).to_string();
            let phone = contact.phone.clone();
            let body = render::render_for(&template, contact, &self.fallback_name);

            self.update(|job| {
                job.current_contact = Some(CurrentContact {
                    name: name.clone(),
                    phone: phone.clone(),
                });
            });

            let address = chat_address(&phone, self.transport.chat_suffix());
            let result =
                match deliver_with_timeout(&*self.transport, &address, &body, self.send_timeout)
                    .await
                {
                    Ok(()) => {
                        info!("bulk send {job_id}: message sent to {name} ({phone})");
                        SendResult::delivered(contact_id, &name, &phone)
                    }
                    Err(e) => {
                        warn!("bulk send {job_id}: failed to send to {name} ({phone}): {e}");
                        SendResult::failed(contact_id, &name, &phone, e)
                    }
                };
            self.update(|job| job.record(result));

            let more_remaining = index + 1 < total;
            if more_remaining && !cancel.is_cancelled() {
                let delay_ms = self.delay.next_delay_ms();
                debug!("bulk send {job_id}: next message in {delay_ms}ms");
                let outcome = self
                    .delay
                    .wait(Duration::from_millis(delay_ms), &cancel, |remaining| {
                        self.update(|job| job.next_send_in = remaining);
                    })
                    .await;
                if outcome == WaitOutcome::Cancelled {
                    break;
                }
            }
        }

        let job = self.state.lock().job.clone();
        let delivered = job.results.iter().filter(|r| r.success).count();
        if cancel.is_cancelled() {
            info!(
                "bulk send {job_id} cancelled: {}/{} processed, {delivered} delivered",
                job.sent, job.total
            );
        } else {
            info!(
                "bulk send {job_id} completed: {}/{} processed, {delivered} delivered",
                job.sent, job.total
            );
        }
    }
}

/// Finalizes the job state when the processing task ends, including by panic.
struct FinishGuard {
    inner: Arc<Inner>,
    job_id: Uuid,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        if state.job.job_id == Some(self.job_id) {
            state.job.finish();
            state.cancel = None;
        }
    }
}

/// One transport call, bounded by `timeout`. The error is the message to
/// record for the recipient.
pub async fn deliver_with_timeout(
    transport: &dyn MessageTransport,
    address: &str,
    body: &str,
    timeout: Duration,
) -> Result<(), String> {
    match tokio::time::timeout(timeout, transport.send(address, body)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("send timed out after {}s", timeout.as_secs())),
    }
}
