//! Unit tests for verification sessions

use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{ChannelKind, ChannelStage, VerificationMode};
use crate::domain::value_objects::{FailureReason, SessionOutcome};
use crate::errors::{ConfigError, OtpError};
use crate::services::verification::{SessionBuilder, StaticTemplates, VerificationSession};

use super::mocks::{settle, Behavior, MockNotifier, Recorder};

fn phone_session(notifier: Arc<MockNotifier>, recorder: &Arc<Recorder>) -> VerificationSession {
    recorder
        .attach(VerificationSession::builder())
        .phone("+15551234")
        .sms_notifier(notifier)
        .build()
        .unwrap()
}

fn dual_session(
    sms: Arc<MockNotifier>,
    email: Arc<MockNotifier>,
    shared: bool,
    recorder: &Arc<Recorder>,
) -> VerificationSession {
    recorder
        .attach(VerificationSession::builder())
        .phone("+15551234")
        .email("a@b.com")
        .single_shared_code(shared)
        .sms_notifier(sms)
        .email_notifier(email)
        .build()
        .unwrap()
}

fn build_error(builder: SessionBuilder) -> ConfigError {
    match builder.build() {
        Err(OtpError::Configuration(err)) => err,
        other => panic!("expected configuration error, got {:?}", other.map(|s| s.id())),
    }
}

#[test]
fn test_build_requires_destination() {
    let recorder = Recorder::new();
    let builder = recorder
        .attach(SessionBuilder::new())
        .sms_notifier(MockNotifier::delivering());
    assert_eq!(build_error(builder), ConfigError::MissingDestination);

    let builder = recorder
        .attach(SessionBuilder::new())
        .phone("   ")
        .sms_notifier(MockNotifier::delivering());
    assert_eq!(
        build_error(builder),
        ConfigError::EmptyDestination { channel: ChannelKind::Sms }
    );
}

#[test]
fn test_build_requires_every_callback() {
    let builder = SessionBuilder::new()
        .phone("+15551234")
        .sms_notifier(MockNotifier::delivering())
        .on_verified(|| {})
        .on_dispatch_failed(|_| {});
    assert_eq!(
        build_error(builder),
        ConfigError::MissingCallback { name: "on_cancelled" }
    );
}

#[test]
fn test_build_requires_notifier_per_destination() {
    let recorder = Recorder::new();
    let builder = recorder
        .attach(SessionBuilder::new())
        .phone("+15551234")
        .email("a@b.com")
        .sms_notifier(MockNotifier::delivering());
    assert_eq!(
        build_error(builder),
        ConfigError::NotifierUnavailable { channel: ChannelKind::Email }
    );
}

#[test]
fn test_build_rejects_zero_timeout() {
    let recorder = Recorder::new();
    let builder = recorder
        .attach(SessionBuilder::new())
        .phone("+15551234")
        .sms_notifier(MockNotifier::delivering())
        .user_timeout_secs(0);
    assert_eq!(
        build_error(builder),
        ConfigError::InvalidTimeout { name: "user_timeout" }
    );
}

#[tokio::test(start_paused = true)]
async fn test_modes_follow_destinations() {
    let recorder = Recorder::new();
    let session = phone_session(MockNotifier::delivering(), &recorder);
    assert_eq!(session.mode(), VerificationMode::SinglePhoneOnly);

    let dual = dual_session(MockNotifier::delivering(), MockNotifier::delivering(), false, &recorder);
    assert_eq!(dual.mode(), VerificationMode::DualIndependent);
    assert_eq!(dual.snapshot().await.channels.len(), 2);

    let shared = dual_session(MockNotifier::delivering(), MockNotifier::delivering(), true, &recorder);
    assert_eq!(shared.mode(), VerificationMode::DualSharedCode);
    let snapshot = shared.snapshot().await;
    assert_eq!(snapshot.channels.len(), 1);
    assert_eq!(snapshot.channels[0].kinds, vec![ChannelKind::Sms, ChannelKind::Email]);
    assert_eq!(snapshot.channels[0].hint, "OTP sent to +1...34 & a@...com");
}

#[tokio::test(start_paused = true)]
async fn test_operations_require_start_once() {
    let recorder = Recorder::new();
    let session = phone_session(MockNotifier::delivering(), &recorder);

    assert_eq!(
        session.submit_code(ChannelKind::Sms, 123456).await,
        Err(OtpError::NotStarted)
    );
    assert_eq!(session.cancel().await, Err(OtpError::NotStarted));

    let snapshot = session.snapshot().await;
    assert!(!snapshot.closed);
    assert_eq!(snapshot.channels[0].stage, ChannelStage::Idle);

    session.start().unwrap();
    assert_eq!(session.start(), Err(OtpError::AlreadyStarted));
}

#[tokio::test(start_paused = true)]
async fn test_single_channel_verification() {
    let notifier = MockNotifier::delivering();
    let recorder = Recorder::new();
    let session = phone_session(notifier.clone(), &recorder);
    session.start().unwrap();
    settle().await;

    let code = notifier.last_code();
    let wrong = if code == 999_999 { 100_000 } else { code + 1 };
    assert_eq!(session.submit_code(ChannelKind::Sms, wrong).await, Ok(false));
    assert!(!session.is_closed());

    assert_eq!(session.submit_code(ChannelKind::Sms, code).await, Ok(true));
    assert_eq!(session.wait_for_outcome().await, Ok(SessionOutcome::Verified));
    assert_eq!(recorder.verified(), 1);
    assert_eq!(recorder.total(), 1);

    assert_eq!(
        session.submit_code(ChannelKind::Sms, code).await,
        Err(OtpError::SessionClosed)
    );
    let snapshot = session.snapshot().await;
    assert!(snapshot.closed);
    assert_eq!(snapshot.outcome, Some(SessionOutcome::Verified));
    assert!(snapshot.channels[0].verified);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_channel_is_rejected() {
    let recorder = Recorder::new();
    let session = phone_session(MockNotifier::delivering(), &recorder);
    session.start().unwrap();
    settle().await;

    assert_eq!(
        session.submit_code(ChannelKind::Email, 123456).await,
        Err(OtpError::ChannelNotConfigured { channel: ChannelKind::Email })
    );
    assert_eq!(
        session.request_resend(ChannelKind::Email).await,
        Err(OtpError::ChannelNotConfigured { channel: ChannelKind::Email })
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_fires_once() {
    let recorder = Recorder::new();
    let session = phone_session(MockNotifier::delivering(), &recorder);
    session.start().unwrap();
    settle().await;

    session.cancel().await.unwrap();
    session.cancel().await.unwrap();
    session.request_resend(ChannelKind::Sms).await.unwrap();

    assert_eq!(session.outcome(), Some(SessionOutcome::Cancelled));
    assert_eq!(recorder.cancelled(), 1);
    assert_eq!(recorder.total(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_closed_at_marks_terminal_outcome() {
    let recorder = Recorder::new();
    let session = phone_session(MockNotifier::delivering(), &recorder);
    session.start().unwrap();
    settle().await;
    let started = tokio::time::Instant::now();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(session.closed_at().is_none());

    session.cancel().await.unwrap();
    let closed_at = session.closed_at().unwrap();
    assert!(closed_at >= started + Duration::from_secs(30));

    tokio::time::sleep(Duration::from_secs(10)).await;
    session.cancel().await.unwrap();
    assert_eq!(session.closed_at(), Some(closed_at));
}

#[tokio::test(start_paused = true)]
async fn test_completion_after_cancel_is_ignored() {
    let notifier = MockNotifier::new(Behavior::Delay(Duration::from_secs(5), true));
    let recorder = Recorder::new();
    let session = phone_session(notifier, &recorder);
    session.start().unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    session.cancel().await.unwrap();
    tokio::time::sleep(Duration::from_secs(400)).await;

    assert_eq!(session.outcome(), Some(SessionOutcome::Cancelled));
    assert_eq!(recorder.total(), 1);
    assert_eq!(session.snapshot().await.channels[0].stage, ChannelStage::Dispatching);
}

#[tokio::test(start_paused = true)]
async fn test_single_channel_dispatch_failure_aborts() {
    let recorder = Recorder::new();
    let session = phone_session(MockNotifier::failing(), &recorder);
    session.start().unwrap();

    assert_eq!(
        session.wait_for_outcome().await,
        Ok(SessionOutcome::Failed(FailureReason::DispatchFailed))
    );
    assert_eq!(recorder.failures(), vec![FailureReason::DispatchFailed]);
    assert_eq!(recorder.total(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_single_channel_dispatch_timeout_aborts() {
    let recorder = Recorder::new();
    let session = phone_session(MockNotifier::new(Behavior::Hang), &recorder);
    session.start().unwrap();

    tokio::time::sleep(Duration::from_secs(9)).await;
    assert!(!session.is_closed());
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(
        session.outcome(),
        Some(SessionOutcome::Failed(FailureReason::DispatchFailed))
    );
}

#[tokio::test(start_paused = true)]
async fn test_unverified_code_expires() {
    let recorder = Recorder::new();
    let session = phone_session(MockNotifier::delivering(), &recorder);
    session.start().unwrap();

    tokio::time::sleep(Duration::from_secs(121)).await;
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.channels[0].stage, ChannelStage::ResendOffered);
    assert!(!session.is_closed());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(
        session.outcome(),
        Some(SessionOutcome::Failed(FailureReason::Expired))
    );
    assert_eq!(recorder.failures(), vec![FailureReason::Expired]);
}

#[tokio::test(start_paused = true)]
async fn test_dual_independent_survives_one_failure() {
    let sms = MockNotifier::failing();
    let email = MockNotifier::delivering();
    let recorder = Recorder::new();
    let session = dual_session(sms.clone(), email.clone(), false, &recorder);
    session.start().unwrap();
    settle().await;

    assert!(!session.is_closed());
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.channels[0].stage, ChannelStage::DispatchFailed);
    assert!(snapshot.channels[0].resend_available);
    assert_eq!(snapshot.channels[1].stage, ChannelStage::Delivered);

    assert_eq!(session.submit_code(ChannelKind::Email, email.last_code()).await, Ok(true));
    assert!(!session.is_closed());
    assert_eq!(recorder.total(), 0);

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(
        session.outcome(),
        Some(SessionOutcome::Failed(FailureReason::Expired))
    );
    assert_eq!(recorder.failures(), vec![FailureReason::Expired]);
    assert_eq!(recorder.total(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dual_independent_failure_after_other_channel_verified() {
    let sms = MockNotifier::new(Behavior::Delay(Duration::from_secs(5), false));
    let email = MockNotifier::delivering();
    let recorder = Recorder::new();
    let session = dual_session(sms, email.clone(), false, &recorder);
    session.start().unwrap();
    settle().await;

    assert_eq!(session.submit_code(ChannelKind::Email, email.last_code()).await, Ok(true));
    tokio::time::sleep(Duration::from_secs(6)).await;
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.channels[0].stage, ChannelStage::DispatchFailed);
    assert!(snapshot.channels[0].expiry_countdown);
    assert!(!session.is_closed());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(
        session.outcome(),
        Some(SessionOutcome::Failed(FailureReason::Expired))
    );
    assert_eq!(recorder.failures(), vec![FailureReason::Expired]);
    assert_eq!(recorder.total(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dual_independent_dispatch_timeout_then_expiry() {
    let sms = MockNotifier::new(Behavior::Hang);
    let email = MockNotifier::delivering();
    let recorder = Recorder::new();
    let session = dual_session(sms, email.clone(), false, &recorder);
    session.start().unwrap();
    settle().await;

    assert_eq!(session.submit_code(ChannelKind::Email, email.last_code()).await, Ok(true));
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(
        session.snapshot().await.channels[0].stage,
        ChannelStage::DispatchFailed
    );

    assert_eq!(
        session.wait_for_outcome().await,
        Ok(SessionOutcome::Failed(FailureReason::Expired))
    );
    assert_eq!(recorder.total(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dual_independent_aborts_when_both_fail() {
    let recorder = Recorder::new();
    let session = dual_session(MockNotifier::failing(), MockNotifier::failing(), false, &recorder);
    session.start().unwrap();

    assert_eq!(
        session.wait_for_outcome().await,
        Ok(SessionOutcome::Failed(FailureReason::DispatchFailed))
    );
    assert_eq!(recorder.total(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_resend_after_dispatch_failure() {
    let sms = MockNotifier::scripted(vec![Behavior::Fail, Behavior::Deliver]);
    let email = MockNotifier::delivering();
    let recorder = Recorder::new();
    let session = dual_session(sms.clone(), email.clone(), false, &recorder);
    session.start().unwrap();
    settle().await;

    session.request_resend(ChannelKind::Sms).await.unwrap();
    settle().await;
    assert_eq!(
        session.snapshot().await.channels[0].stage,
        ChannelStage::RedeliveredAwaitingExpiry
    );

    assert_eq!(session.submit_code(ChannelKind::Sms, sms.last_code()).await, Ok(true));
    assert_eq!(session.submit_code(ChannelKind::Email, email.last_code()).await, Ok(true));
    assert_eq!(session.outcome(), Some(SessionOutcome::Verified));
    assert_eq!(recorder.verified(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_resend_unavailable_while_resend_window_runs() {
    let recorder = Recorder::new();
    let session = phone_session(MockNotifier::delivering(), &recorder);
    session.start().unwrap();
    settle().await;

    assert_eq!(
        session.request_resend(ChannelKind::Sms).await,
        Err(OtpError::ResendUnavailable {
            channel: ChannelKind::Sms,
            stage: ChannelStage::Delivered,
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_shared_code_verifies_through_either_kind() {
    let sms = MockNotifier::delivering();
    let email = MockNotifier::delivering();
    let recorder = Recorder::new();
    let session = dual_session(sms.clone(), email.clone(), true, &recorder);
    session.start().unwrap();
    settle().await;

    assert_eq!(sms.last_payload(), email.last_payload());
    assert_eq!(session.submit_code(ChannelKind::Email, sms.last_code()).await, Ok(true));
    assert_eq!(session.outcome(), Some(SessionOutcome::Verified));
}

#[tokio::test(start_paused = true)]
async fn test_template_and_tag_reach_notifier() {
    let notifier = MockNotifier::delivering();
    let recorder = Recorder::new();
    let templates = StaticTemplates::new().with("login", ChannelKind::Sms, "Login code <1>");
    let session = recorder
        .attach(VerificationSession::builder())
        .phone("+15551234")
        .sms_notifier(notifier.clone())
        .templates(Arc::new(templates))
        .template_name("login")
        .custom_tag("web")
        .build()
        .unwrap();
    session.start().unwrap();
    settle().await;

    let sent = notifier.last_message().unwrap();
    assert_eq!(sent.message, format!("Login code {}", sent.payload));
    assert_eq!(sent.custom_tag.as_deref(), Some("web"));
    let prefix = session.snapshot().await.channels[0].prefix.clone().unwrap();
    assert!(sent.payload.starts_with(&prefix));
}

#[tokio::test(start_paused = true)]
async fn test_dropping_open_session_cancels_it() {
    let recorder = Recorder::new();
    let session = phone_session(MockNotifier::delivering(), &recorder);
    session.start().unwrap();
    settle().await;

    drop(session);
    settle().await;
    assert_eq!(recorder.cancelled(), 1);
    assert_eq!(recorder.total(), 1);
}
