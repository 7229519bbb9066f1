//! Channel senders: run notifier calls on background workers and track the
//! status of each dispatch attempt.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use otp_shared::contact::mask_destination;
use tokio::task::JoinHandle;

use crate::domain::entities::{ChannelKind, SendStatus};
use crate::services::verification::config::VerificationConfig;
use crate::services::verification::traits::Notifier;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Clone, Copy)]
struct AttemptStatus {
    attempt: u64,
    status: SendStatus,
}

/// Status of the current dispatch attempt, shared with its worker
///
/// Only the attempt that is current may finalize the status, and only once.
#[derive(Debug, Clone)]
pub struct StatusCell {
    inner: Arc<Mutex<AttemptStatus>>,
}

impl Default for StatusCell {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(AttemptStatus {
                attempt: 0,
                status: SendStatus::NotStarted,
            })),
        }
    }
}

impl StatusCell {
    pub fn get(&self) -> SendStatus {
        lock(&self.inner).status
    }

    /// Status of `attempt`, or `None` if another attempt is current
    pub fn get_for(&self, attempt: u64) -> Option<SendStatus> {
        let state = lock(&self.inner);
        (state.attempt == attempt).then_some(state.status)
    }

    /// Start a new attempt at `NotStarted`
    pub fn reset(&self, attempt: u64) {
        *lock(&self.inner) = AttemptStatus {
            attempt,
            status: SendStatus::NotStarted,
        };
    }

    pub fn begin(&self, attempt: u64) {
        let mut state = lock(&self.inner);
        if state.attempt == attempt && state.status == SendStatus::NotStarted {
            state.status = SendStatus::Started;
        }
    }

    /// Move a started attempt to its final status
    ///
    /// Returns `false` when the attempt is stale or already final.
    pub fn finish(&self, attempt: u64, status: SendStatus) -> bool {
        let mut state = lock(&self.inner);
        if state.attempt != attempt || state.status != SendStatus::Started {
            return false;
        }
        state.status = status;
        true
    }

    /// First-success-wins settlement of a combined attempt
    ///
    /// `mine` is the final status of one sub-sender, `other` the status cell
    /// of its sibling. Runs under this cell's lock so two sub-senders
    /// completing together finalize it exactly once.
    fn settle(&self, attempt: u64, mine: SendStatus, other: &StatusCell) -> Option<SendStatus> {
        let mut state = lock(&self.inner);
        if state.attempt != attempt || state.status != SendStatus::Started {
            return None;
        }
        let next = match mine {
            SendStatus::Delivered => SendStatus::Delivered,
            SendStatus::Failed if other.get_for(attempt) == Some(SendStatus::Failed) => {
                SendStatus::Failed
            }
            _ => return None,
        };
        state.status = next;
        Some(next)
    }
}

/// Wraps one notifier and dispatches codes to one destination
pub struct ChannelSender {
    kind: ChannelKind,
    destination: String,
    notifier: Arc<dyn Notifier>,
    message_template: String,
    custom_tag: Option<String>,
    status: StatusCell,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ChannelSender {
    pub fn new(
        kind: ChannelKind,
        destination: impl Into<String>,
        notifier: Arc<dyn Notifier>,
        message_template: impl Into<String>,
        custom_tag: Option<String>,
    ) -> Self {
        Self {
            kind,
            destination: destination.into(),
            notifier,
            message_template: message_template.into(),
            custom_tag,
            status: StatusCell::default(),
            worker: Mutex::new(None),
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn status(&self) -> SendStatus {
        self.status.get()
    }

    pub(crate) fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    /// Start dispatch attempt `attempt` on a background worker
    ///
    /// `on_complete` runs on the worker once the notifier answers, unless the
    /// attempt was expired or superseded in the meantime.
    pub fn dispatch<F>(&self, attempt: u64, payload: String, on_complete: F)
    where
        F: FnOnce(SendStatus) + Send + 'static,
    {
        self.abort();
        self.status.reset(attempt);
        self.status.begin(attempt);

        let notifier = Arc::clone(&self.notifier);
        let status = self.status.clone();
        let destination = self.destination.clone();
        let template = self.message_template.clone();
        let custom_tag = self.custom_tag.clone();
        let kind = self.kind;

        tracing::debug!(
            channel = %kind,
            destination = %mask_destination(&destination),
            provider = notifier.provider_name(),
            attempt,
            event = "otp_dispatch_started",
            "Dispatching code"
        );

        let handle = tokio::spawn(async move {
            let delivered = notifier
                .send(&destination, &template, &payload, custom_tag.as_deref())
                .await;
            let outcome = if delivered {
                SendStatus::Delivered
            } else {
                SendStatus::Failed
            };
            if status.finish(attempt, outcome) {
                on_complete(outcome);
            } else {
                tracing::debug!(
                    channel = %kind,
                    attempt,
                    "Ignoring notifier result of a finished attempt"
                );
            }
        });
        *lock(&self.worker) = Some(handle);
    }

    /// Finalize a still-running attempt as failed and stop its worker
    pub fn expire(&self, attempt: u64) -> bool {
        if self.status.finish(attempt, SendStatus::Failed) {
            self.abort();
            true
        } else {
            false
        }
    }

    /// Stop the background worker, if any
    pub fn abort(&self) {
        if let Some(handle) = lock(&self.worker).take() {
            handle.abort();
        }
    }
}

impl Drop for ChannelSender {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Sends one code over two senders; delivery on either one suffices
pub struct CombinedSender {
    sms: ChannelSender,
    email: ChannelSender,
    status: StatusCell,
}

impl CombinedSender {
    pub fn new(sms: ChannelSender, email: ChannelSender) -> Self {
        Self {
            sms,
            email,
            status: StatusCell::default(),
        }
    }

    /// Derived status: delivered if either delivered, failed only if both failed
    pub fn status(&self) -> SendStatus {
        self.status.get()
    }

    pub fn sms(&self) -> &ChannelSender {
        &self.sms
    }

    pub fn email(&self) -> &ChannelSender {
        &self.email
    }

    /// Start both sub-senders with the same payload
    ///
    /// `on_complete` runs at most once, with the combined status.
    pub fn dispatch<F>(&self, attempt: u64, payload: String, on_complete: F)
    where
        F: FnOnce(SendStatus) + Send + 'static,
    {
        self.status.reset(attempt);
        self.status.begin(attempt);

        let on_complete = Arc::new(Mutex::new(Some(on_complete)));
        let pairs = [
            (&self.sms, self.email.status_cell().clone()),
            (&self.email, self.sms.status_cell().clone()),
        ];
        for (sender, other) in pairs {
            let combined = self.status.clone();
            let on_complete = Arc::clone(&on_complete);
            let kind = sender.kind();
            sender.dispatch(attempt, payload.clone(), move |mine| {
                match combined.settle(attempt, mine, &other) {
                    Some(status) => {
                        if let Some(callback) = lock(&on_complete).take() {
                            callback(status);
                        }
                    }
                    None => tracing::debug!(
                        channel = %kind,
                        status = ?mine,
                        attempt,
                        "Sub-sender finished without settling the shared code"
                    ),
                }
            });
        }
    }

    /// Finalize a still-running combined attempt as failed
    pub fn expire(&self, attempt: u64) -> bool {
        if self.status.finish(attempt, SendStatus::Failed) {
            self.sms.expire(attempt);
            self.email.expire(attempt);
            true
        } else {
            false
        }
    }

    pub fn abort(&self) {
        self.sms.abort();
        self.email.abort();
    }
}

/// The sender owned by one channel
pub enum OtpSender {
    Single(ChannelSender),
    Combined(CombinedSender),
}

impl OtpSender {
    pub fn status(&self) -> SendStatus {
        match self {
            OtpSender::Single(sender) => sender.status(),
            OtpSender::Combined(sender) => sender.status(),
        }
    }

    pub fn dispatch<F>(&self, attempt: u64, payload: String, on_complete: F)
    where
        F: FnOnce(SendStatus) + Send + 'static,
    {
        match self {
            OtpSender::Single(sender) => sender.dispatch(attempt, payload, on_complete),
            OtpSender::Combined(sender) => sender.dispatch(attempt, payload, on_complete),
        }
    }

    pub fn expire(&self, attempt: u64) -> bool {
        match self {
            OtpSender::Single(sender) => sender.expire(attempt),
            OtpSender::Combined(sender) => sender.expire(attempt),
        }
    }

    pub fn abort(&self) {
        match self {
            OtpSender::Single(sender) => sender.abort(),
            OtpSender::Combined(sender) => sender.abort(),
        }
    }

    /// Contact methods this sender delivers over
    pub fn kinds(&self) -> Vec<ChannelKind> {
        match self {
            OtpSender::Single(sender) => vec![sender.kind()],
            OtpSender::Combined(sender) => vec![sender.sms.kind(), sender.email.kind()],
        }
    }

    pub fn destinations(&self) -> Vec<&str> {
        match self {
            OtpSender::Single(sender) => vec![sender.destination()],
            OtpSender::Combined(sender) => {
                vec![sender.sms.destination(), sender.email.destination()]
            }
        }
    }

    /// Dispatch timeout; the longer of both for a combined sender
    pub fn dispatch_timeout(&self, config: &VerificationConfig) -> Duration {
        match self {
            OtpSender::Single(sender) => config.sender_timeout(sender.kind()),
            OtpSender::Combined(_) => config.combined_sender_timeout(),
        }
    }
}
