//! Verification session: owns the channels, serializes every event through
//! one queue and reports exactly one terminal outcome.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::entities::{ChannelKind, ChannelStage, OtpGenerator, VerificationMode};
use crate::domain::value_objects::{FailureReason, SessionOutcome, SessionSnapshot};
use crate::errors::{ConfigError, OtpError, OtpResult};
use crate::services::verification::channel::{ChannelSignal, OtpChannel};
use crate::services::verification::config::VerificationConfig;
use crate::services::verification::events::SessionEvent;
use crate::services::verification::sender::{ChannelSender, CombinedSender, OtpSender};
use crate::services::verification::template::resolve_template;
use crate::services::verification::traits::{MessageTemplates, Notifier};

type VerifiedCallback = Box<dyn FnOnce() + Send>;
type CancelledCallback = Box<dyn FnOnce() + Send>;
type DispatchFailedCallback = Box<dyn FnOnce(FailureReason) + Send>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Callbacks {
    on_verified: VerifiedCallback,
    on_cancelled: CancelledCallback,
    on_dispatch_failed: DispatchFailedCallback,
}

/// Builder for [`VerificationSession`]
///
/// At least one destination and all three callbacks are required, as is a
/// notifier for every destination given.
#[derive(Default)]
pub struct SessionBuilder {
    phone: Option<String>,
    email: Option<String>,
    single_shared_code: bool,
    sms_notifier: Option<Arc<dyn Notifier>>,
    email_notifier: Option<Arc<dyn Notifier>>,
    templates: Option<Arc<dyn MessageTemplates>>,
    template_name: Option<String>,
    custom_tag: Option<String>,
    config: VerificationConfig,
    generator: Option<Arc<OtpGenerator>>,
    on_verified: Option<VerifiedCallback>,
    on_cancelled: Option<CancelledCallback>,
    on_dispatch_failed: Option<DispatchFailedCallback>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Send one code to both destinations instead of one code each
    pub fn single_shared_code(mut self, shared: bool) -> Self {
        self.single_shared_code = shared;
        self
    }

    pub fn sms_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.sms_notifier = Some(notifier);
        self
    }

    pub fn email_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.email_notifier = Some(notifier);
        self
    }

    pub fn templates(mut self, templates: Arc<dyn MessageTemplates>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    pub fn custom_tag(mut self, tag: impl Into<String>) -> Self {
        self.custom_tag = Some(tag.into());
        self
    }

    pub fn config(mut self, config: VerificationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn user_timeout_secs(mut self, secs: u64) -> Self {
        self.config.user_timeout_secs = secs;
        self
    }

    pub fn sender_timeout_sms_secs(mut self, secs: u64) -> Self {
        self.config.sender_timeout_sms_secs = secs;
        self
    }

    pub fn sender_timeout_email_secs(mut self, secs: u64) -> Self {
        self.config.sender_timeout_email_secs = secs;
        self
    }

    pub fn resend_timeout_secs(mut self, secs: u64) -> Self {
        self.config.resend_timeout_secs = secs;
        self
    }

    /// Share a random source between sessions
    pub fn generator(mut self, generator: Arc<OtpGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn on_verified<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_verified = Some(Box::new(callback));
        self
    }

    pub fn on_cancelled<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_cancelled = Some(Box::new(callback));
        self
    }

    pub fn on_dispatch_failed<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(FailureReason) + Send + 'static,
    {
        self.on_dispatch_failed = Some(Box::new(callback));
        self
    }

    fn destination(value: Option<String>, channel: ChannelKind) -> Result<Option<String>, ConfigError> {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if v.is_empty() => Err(ConfigError::EmptyDestination { channel }),
            other => Ok(other),
        }
    }

    /// Validate the configuration and assemble an unstarted session
    pub fn build(self) -> OtpResult<VerificationSession> {
        let phone = Self::destination(self.phone, ChannelKind::Sms)?;
        let email = Self::destination(self.email, ChannelKind::Email)?;
        let mode = VerificationMode::resolve(phone.is_some(), email.is_some(), self.single_shared_code)
            .ok_or(ConfigError::MissingDestination)?;

        let callbacks = Callbacks {
            on_verified: self
                .on_verified
                .ok_or(ConfigError::MissingCallback { name: "on_verified" })?,
            on_cancelled: self
                .on_cancelled
                .ok_or(ConfigError::MissingCallback { name: "on_cancelled" })?,
            on_dispatch_failed: self.on_dispatch_failed.ok_or(ConfigError::MissingCallback {
                name: "on_dispatch_failed",
            })?,
        };
        self.config.validate()?;

        let templates = self.templates.as_deref();
        let template_name = self.template_name.as_deref();
        let custom_tag = self.custom_tag;

        let sms = match phone {
            Some(phone) => {
                let notifier = self
                    .sms_notifier
                    .ok_or(ConfigError::NotifierUnavailable { channel: ChannelKind::Sms })?;
                Some(ChannelSender::new(
                    ChannelKind::Sms,
                    phone,
                    notifier,
                    resolve_template(templates, template_name, ChannelKind::Sms),
                    custom_tag.clone(),
                ))
            }
            None => None,
        };
        let email = match email {
            Some(email) => {
                let notifier = self
                    .email_notifier
                    .ok_or(ConfigError::NotifierUnavailable { channel: ChannelKind::Email })?;
                Some(ChannelSender::new(
                    ChannelKind::Email,
                    email,
                    notifier,
                    resolve_template(templates, template_name, ChannelKind::Email),
                    custom_tag,
                ))
            }
            None => None,
        };

        let senders = match (sms, email) {
            (Some(sms), Some(email)) if mode == VerificationMode::DualSharedCode => {
                vec![OtpSender::Combined(CombinedSender::new(sms, email))]
            }
            (sms, email) => sms
                .into_iter()
                .chain(email)
                .map(OtpSender::Single)
                .collect(),
        };

        let id = Uuid::new_v4();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = watch::channel(None);
        let final_snapshot = Arc::new(Mutex::new(None));
        let closed_at = Arc::new(Mutex::new(None));

        let channels = senders
            .into_iter()
            .enumerate()
            .map(|(index, sender)| OtpChannel::new(index, sender, events_tx.downgrade()))
            .collect();

        tracing::info!(session_id = %id, mode = ?mode, event = "session_created", "Created verification session");

        let actor = SessionActor {
            id,
            mode,
            channels,
            generator: self
                .generator
                .unwrap_or_else(|| Arc::new(OtpGenerator::new())),
            config: self.config,
            events: events_rx,
            callbacks: Some(callbacks),
            outcome: outcome_tx,
            final_snapshot: Arc::clone(&final_snapshot),
            closed_at: Arc::clone(&closed_at),
            closed: false,
        };

        Ok(VerificationSession {
            id,
            mode,
            events: events_tx,
            pending: Mutex::new(Some(actor)),
            outcome: outcome_rx,
            final_snapshot,
            closed_at,
        })
    }
}

/// One OTP verification over one or two channels
///
/// All state lives in a task started by [`start`](Self::start); the
/// methods here post events to it and await the reply. Exactly one of the
/// verified, cancelled and dispatch-failed callbacks runs, once. Dropping
/// an open session cancels it.
pub struct VerificationSession {
    id: Uuid,
    mode: VerificationMode,
    events: mpsc::UnboundedSender<SessionEvent>,
    pending: Mutex<Option<SessionActor>>,
    outcome: watch::Receiver<Option<SessionOutcome>>,
    final_snapshot: Arc<Mutex<Option<SessionSnapshot>>>,
    closed_at: Arc<Mutex<Option<Instant>>>,
}

impl fmt::Debug for VerificationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationSession")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("outcome", &self.outcome())
            .finish()
    }
}

impl VerificationSession {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> VerificationMode {
        self.mode
    }

    /// Send the first code(s) and start processing events
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> OtpResult<()> {
        let actor = lock(&self.pending).take().ok_or(OtpError::AlreadyStarted)?;
        let span = tracing::info_span!("otp_session", session_id = %self.id);
        tokio::spawn(actor.run().instrument(span));
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        lock(&self.pending).is_none()
    }

    fn ensure_started(&self) -> OtpResult<()> {
        if self.is_started() {
            Ok(())
        } else {
            Err(OtpError::NotStarted)
        }
    }

    async fn request<T>(
        &self,
        event: impl FnOnce(oneshot::Sender<OtpResult<T>>) -> SessionEvent,
    ) -> OtpResult<T> {
        self.ensure_started()?;
        let (reply, response) = oneshot::channel();
        self.events
            .send(event(reply))
            .map_err(|_| OtpError::SessionClosed)?;
        response.await.map_err(|_| OtpError::SessionClosed)?
    }

    /// Check a code entered for `kind`
    ///
    /// `Ok(false)` on a mismatch or when no delivered code is outstanding.
    pub async fn submit_code(&self, kind: ChannelKind, code: u32) -> OtpResult<bool> {
        self.request(|reply| SessionEvent::Submit { kind, code, reply })
            .await
    }

    /// Ask for a fresh code on `kind`; a no-op once the session is closed
    pub async fn request_resend(&self, kind: ChannelKind) -> OtpResult<()> {
        match self.request(|reply| SessionEvent::Resend { kind, reply }).await {
            Err(OtpError::SessionClosed) => Ok(()),
            other => other,
        }
    }

    /// Cancel the session; a no-op once it is closed
    pub async fn cancel(&self) -> OtpResult<()> {
        match self.request(|reply| SessionEvent::Cancel { reply }).await {
            Err(OtpError::SessionClosed) => Ok(()),
            other => other,
        }
    }

    /// Current display state
    pub async fn snapshot(&self) -> SessionSnapshot {
        let pending = lock(&self.pending).as_ref().map(SessionActor::snapshot);
        if let Some(snapshot) = pending {
            return snapshot;
        }

        let (reply, response) = oneshot::channel();
        if self.events.send(SessionEvent::Snapshot { reply }).is_ok() {
            if let Ok(snapshot) = response.await {
                return snapshot;
            }
        }
        self.closed_snapshot()
    }

    fn closed_snapshot(&self) -> SessionSnapshot {
        lock(&self.final_snapshot)
            .clone()
            .unwrap_or_else(|| SessionSnapshot {
                session_id: self.id,
                mode: self.mode,
                closed: true,
                outcome: self.outcome(),
                channels: Vec::new(),
            })
    }

    /// Terminal outcome, once reached
    pub fn outcome(&self) -> Option<SessionOutcome> {
        *self.outcome.borrow()
    }

    pub fn is_closed(&self) -> bool {
        self.outcome().is_some()
    }

    /// When the terminal outcome was reached
    pub fn closed_at(&self) -> Option<Instant> {
        *lock(&self.closed_at)
    }

    /// Wait until the session reaches its terminal outcome
    pub async fn wait_for_outcome(&self) -> OtpResult<SessionOutcome> {
        let mut outcome = self.outcome.clone();
        loop {
            if let Some(result) = *outcome.borrow_and_update() {
                return Ok(result);
            }
            outcome
                .changed()
                .await
                .map_err(|_| OtpError::SessionClosed)?;
        }
    }
}

struct SessionActor {
    id: Uuid,
    mode: VerificationMode,
    channels: Vec<OtpChannel>,
    generator: Arc<OtpGenerator>,
    config: VerificationConfig,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    callbacks: Option<Callbacks>,
    outcome: watch::Sender<Option<SessionOutcome>>,
    final_snapshot: Arc<Mutex<Option<SessionSnapshot>>>,
    closed_at: Arc<Mutex<Option<Instant>>>,
    closed: bool,
}

impl SessionActor {
    async fn run(mut self) {
        tracing::info!(mode = ?self.mode, channels = self.channels.len(), "Starting verification session");
        for channel in &mut self.channels {
            channel.send_otp(&self.generator, &self.config);
        }

        while let Some(event) = self.events.recv().await {
            self.handle(event);
            if self.closed {
                break;
            }
        }

        if !self.closed {
            tracing::info!("Session handle dropped while open");
            self.close(SessionOutcome::Cancelled);
        }
    }

    fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SendCompleted {
                channel,
                attempt,
                status,
            } => {
                if let Some(target) = self.channels.get_mut(channel) {
                    let signal = target.on_send_completed(attempt, status, &self.config);
                    self.apply(signal);
                }
            }
            SessionEvent::TimerFired {
                channel,
                generation,
            } => {
                if let Some(target) = self.channels.get_mut(channel) {
                    let signal = target.on_timer(generation, &self.config);
                    self.apply(signal);
                }
            }
            SessionEvent::Submit { kind, code, reply } => {
                let result = self.submit(kind, code);
                let _ = reply.send(result);
            }
            SessionEvent::Resend { kind, reply } => {
                let result = self.channel_index(kind).and_then(|index| {
                    self.channels[index].resend(kind, &self.generator, &self.config)
                });
                let _ = reply.send(result);
            }
            SessionEvent::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            SessionEvent::Cancel { reply } => {
                self.close(SessionOutcome::Cancelled);
                let _ = reply.send(Ok(()));
            }
        }
    }

    fn channel_index(&self, kind: ChannelKind) -> OtpResult<usize> {
        self.channels
            .iter()
            .position(|channel| channel.handles(kind))
            .ok_or(OtpError::ChannelNotConfigured { channel: kind })
    }

    fn submit(&mut self, kind: ChannelKind, code: u32) -> OtpResult<bool> {
        let index = self.channel_index(kind)?;
        let verified = self.channels[index].verify(code);
        if verified && self.channels.iter().all(OtpChannel::is_verified) {
            self.close(SessionOutcome::Verified);
        }
        Ok(verified)
    }

    fn apply(&mut self, signal: ChannelSignal) {
        match signal {
            ChannelSignal::DispatchFailed => {
                let abort = match self.mode {
                    VerificationMode::DualIndependent => self
                        .channels
                        .iter()
                        .all(|c| c.stage() == ChannelStage::DispatchFailed),
                    _ => true,
                };
                if abort {
                    self.close(SessionOutcome::Failed(FailureReason::DispatchFailed));
                }
            }
            ChannelSignal::Expired => {
                self.close(SessionOutcome::Failed(FailureReason::Expired));
            }
            ChannelSignal::None | ChannelSignal::Delivered | ChannelSignal::ResendOffered => {}
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            mode: self.mode,
            closed: self.closed,
            outcome: *self.outcome.borrow(),
            channels: self.channels.iter().map(OtpChannel::snapshot).collect(),
        }
    }

    fn close(&mut self, outcome: SessionOutcome) {
        if self.closed {
            return;
        }
        self.closed = true;
        for channel in &mut self.channels {
            channel.abort();
        }
        self.events.close();

        let mut snapshot = self.snapshot();
        snapshot.outcome = Some(outcome);
        *lock(&self.final_snapshot) = Some(snapshot);
        *lock(&self.closed_at) = Some(Instant::now());
        self.outcome.send_replace(Some(outcome));

        match outcome {
            SessionOutcome::Verified => {
                tracing::info!(event = "session_verified", "All channels verified")
            }
            SessionOutcome::Cancelled => {
                tracing::info!(event = "session_cancelled", "Session cancelled")
            }
            SessionOutcome::Failed(reason) => tracing::warn!(
                reason = %reason,
                event = "session_dispatch_failed",
                "Could not complete verification"
            ),
        }

        if let Some(callbacks) = self.callbacks.take() {
            match outcome {
                SessionOutcome::Verified => (callbacks.on_verified)(),
                SessionOutcome::Cancelled => (callbacks.on_cancelled)(),
                SessionOutcome::Failed(reason) => (callbacks.on_dispatch_failed)(reason),
            }
        }
    }
}
