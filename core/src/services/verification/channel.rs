//! Per-channel state machine: generate, send, offer resend, verify, expire

use otp_shared::contact::sent_to_hint;
use tokio::sync::mpsc::WeakUnboundedSender;

use crate::domain::entities::{ChannelKind, ChannelStage, OtpGenerator, OtpSecret, SendStatus};
use crate::domain::value_objects::ChannelSnapshot;
use crate::errors::{OtpError, OtpResult};
use crate::services::verification::config::VerificationConfig;
use crate::services::verification::events::SessionEvent;
use crate::services::verification::sender::OtpSender;
use crate::services::verification::timer::Countdown;

/// What a channel transition means for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChannelSignal {
    None,
    Delivered,
    DispatchFailed,
    ResendOffered,
    Expired,
}

/// One code, its prefix and the sender delivering it
pub(crate) struct OtpChannel {
    index: usize,
    sender: OtpSender,
    secret: Option<OtpSecret>,
    stage: ChannelStage,
    verified: bool,
    /// Whether the running countdown aborts the session when it fires
    expiry_active: bool,
    attempt: u64,
    timer: Option<Countdown>,
    timer_generation: u64,
    events: WeakUnboundedSender<SessionEvent>,
}

impl OtpChannel {
    pub fn new(index: usize, sender: OtpSender, events: WeakUnboundedSender<SessionEvent>) -> Self {
        Self {
            index,
            sender,
            secret: None,
            stage: ChannelStage::Idle,
            verified: false,
            expiry_active: false,
            attempt: 0,
            timer: None,
            timer_generation: 0,
            events,
        }
    }

    pub fn handles(&self, kind: ChannelKind) -> bool {
        self.sender.kinds().contains(&kind)
    }

    pub fn stage(&self) -> ChannelStage {
        self.stage
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    fn label(&self) -> String {
        self.sender
            .kinds()
            .iter()
            .map(ChannelKind::as_str)
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Generate a fresh code and prefix and hand them to the sender
    pub fn send_otp(&mut self, generator: &OtpGenerator, config: &VerificationConfig) {
        self.stage = if self.attempt == 0 {
            ChannelStage::Dispatching
        } else {
            ChannelStage::Redispatching
        };
        self.attempt += 1;

        let secret = generator.generate_secret();
        tracing::info!(
            channel = %self.label(),
            prefix = secret.prefix(),
            attempt = self.attempt,
            event = "otp_generated",
            "Generated new code"
        );
        let payload = secret.payload();
        self.secret = Some(secret);

        let events = self.events.clone();
        let (channel, attempt) = (self.index, self.attempt);
        self.sender.dispatch(attempt, payload, move |status| {
            if let Some(events) = events.upgrade() {
                let _ = events.send(SessionEvent::SendCompleted {
                    channel,
                    attempt,
                    status,
                });
            }
        });

        let timeout = self.sender.dispatch_timeout(config);
        self.start_timer(timeout, false);
    }

    fn start_timer(&mut self, duration: std::time::Duration, expiry: bool) {
        self.stop_timer();
        self.timer_generation += 1;
        self.expiry_active = expiry;

        let events = self.events.clone();
        let (channel, generation) = (self.index, self.timer_generation);
        self.timer = Some(Countdown::after(duration, move || {
            if let Some(events) = events.upgrade() {
                let _ = events.send(SessionEvent::TimerFired {
                    channel,
                    generation,
                });
            }
        }));
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.expiry_active = false;
    }

    /// Apply the final status of a dispatch attempt
    pub fn on_send_completed(
        &mut self,
        attempt: u64,
        status: SendStatus,
        config: &VerificationConfig,
    ) -> ChannelSignal {
        if attempt != self.attempt || !self.stage.is_dispatching() {
            tracing::debug!(channel = %self.label(), attempt, "Dropping stale send completion");
            return ChannelSignal::None;
        }

        match status {
            SendStatus::Delivered => {
                if self.stage == ChannelStage::Dispatching {
                    self.stage = ChannelStage::Delivered;
                    self.start_timer(config.resend_window(), false);
                } else {
                    self.stage = ChannelStage::RedeliveredAwaitingExpiry;
                    self.start_timer(config.user_timeout(), true);
                }
                tracing::info!(
                    channel = %self.label(),
                    attempt,
                    event = "otp_delivered",
                    "Code delivered"
                );
                ChannelSignal::Delivered
            }
            SendStatus::Failed => {
                self.stage = ChannelStage::DispatchFailed;
                // An unused resend still ends the session.
                self.start_timer(config.post_offer_expiry(), true);
                tracing::warn!(
                    channel = %self.label(),
                    attempt,
                    event = "otp_dispatch_failed",
                    "Code could not be delivered"
                );
                ChannelSignal::DispatchFailed
            }
            SendStatus::NotStarted | SendStatus::Started => ChannelSignal::None,
        }
    }

    /// Apply a countdown firing
    pub fn on_timer(&mut self, generation: u64, config: &VerificationConfig) -> ChannelSignal {
        if generation != self.timer_generation || self.timer.is_none() {
            return ChannelSignal::None;
        }
        self.timer = None;

        if self.expiry_active {
            self.expiry_active = false;
            if self.verified {
                return ChannelSignal::None;
            }
            tracing::warn!(
                channel = %self.label(),
                stage = %self.stage,
                event = "otp_expired",
                "Code expired before verification"
            );
            return ChannelSignal::Expired;
        }

        match self.stage {
            ChannelStage::Dispatching | ChannelStage::Redispatching => {
                // A completion that won the race is already queued.
                if !self.sender.expire(self.attempt) {
                    return ChannelSignal::None;
                }
                self.stage = ChannelStage::DispatchFailed;
                self.start_timer(config.post_offer_expiry(), true);
                tracing::warn!(
                    channel = %self.label(),
                    attempt = self.attempt,
                    event = "otp_dispatch_timeout",
                    "Dispatch timed out"
                );
                ChannelSignal::DispatchFailed
            }
            ChannelStage::Delivered => {
                self.stage = ChannelStage::ResendOffered;
                self.start_timer(config.post_offer_expiry(), true);
                tracing::info!(
                    channel = %self.label(),
                    event = "otp_resend_offered",
                    "Resend offered"
                );
                ChannelSignal::ResendOffered
            }
            _ => ChannelSignal::None,
        }
    }

    /// Check a submitted code against the outstanding one
    pub fn verify(&mut self, code: u32) -> bool {
        if !self.stage.accepts_code() {
            tracing::debug!(channel = %self.label(), stage = %self.stage, "No delivered code to check");
            return false;
        }

        let matched = self.secret.as_ref().is_some_and(|s| s.matches(code));
        if matched {
            self.verified = true;
            self.stop_timer();
            tracing::info!(channel = %self.label(), event = "otp_verified", "Code verified");
        } else {
            tracing::info!(channel = %self.label(), event = "otp_mismatch", "Submitted code does not match");
        }
        matched
    }

    /// Send a fresh code, invalidating the outstanding one
    pub fn resend(
        &mut self,
        kind: ChannelKind,
        generator: &OtpGenerator,
        config: &VerificationConfig,
    ) -> OtpResult<()> {
        if self.verified {
            return Ok(());
        }
        if !self.stage.allows_resend() {
            return Err(OtpError::ResendUnavailable {
                channel: kind,
                stage: self.stage,
            });
        }

        self.stop_timer();
        tracing::info!(
            channel = %self.label(),
            previous_stage = %self.stage,
            event = "otp_resent",
            "Resending code"
        );
        self.send_otp(generator, config);
        Ok(())
    }

    /// Stop the countdown and any dispatch in flight
    pub fn abort(&mut self) {
        self.stop_timer();
        self.sender.abort();
    }

    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            kinds: self.sender.kinds(),
            hint: sent_to_hint(&self.sender.destinations()),
            stage: self.stage,
            send_status: self.sender.status(),
            prefix: self.secret.as_ref().map(|s| s.prefix().to_string()),
            verified: self.verified,
            accepts_code: !self.verified && self.stage.accepts_code(),
            resend_available: !self.verified && self.stage.allows_resend(),
            expiry_countdown: self.timer.is_some() && self.expiry_active,
            seconds_remaining: self.timer.as_ref().map(Countdown::seconds_remaining),
        }
    }
}
