//! Integration tests running verification sessions over infrastructure notifiers

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use otp_core::{ChannelKind, Notifier, SessionBuilder, SessionOutcome, VerificationSession};
use otp_infra::notifier::{
    create_notifier, FailoverMessageService, MessageNotifier, MessageService, MockMessageService,
};
use otp_shared::config::{NotifierConfig, NotifierProvider};

const PHONE: &str = "+15551231234";
const EMAIL: &str = "user@example.com";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn quiet_mock(kind: ChannelKind) -> Arc<MockMessageService> {
    Arc::new(MockMessageService::with_options(kind, false, false))
}

fn notifier(kind: ChannelKind, service: impl MessageService + 'static) -> Arc<dyn Notifier> {
    Arc::new(MessageNotifier::new(kind, service))
}

/// Code at the end of the last message sent to `destination`
fn last_code(service: &MockMessageService, destination: &str) -> u32 {
    let message = service.last_message(destination).expect("no message").message;
    message[message.len() - 6..].parse().expect("message without code")
}

fn counting_builder(terminal: &Arc<AtomicUsize>) -> SessionBuilder {
    let (v, c, f) = (terminal.clone(), terminal.clone(), terminal.clone());
    VerificationSession::builder()
        .on_verified(move || {
            v.fetch_add(1, Ordering::SeqCst);
        })
        .on_cancelled(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .on_dispatch_failed(move |_| {
            f.fetch_add(1, Ordering::SeqCst);
        })
}

#[tokio::test]
async fn test_dual_session_over_mock_notifiers() {
    init_tracing();
    let sms = quiet_mock(ChannelKind::Sms);
    let email = quiet_mock(ChannelKind::Email);
    let terminal = Arc::new(AtomicUsize::new(0));

    let session = counting_builder(&terminal)
        .phone(PHONE)
        .email(EMAIL)
        .sms_notifier(notifier(ChannelKind::Sms, sms.clone()))
        .email_notifier(notifier(ChannelKind::Email, email.clone()))
        .custom_tag("integration")
        .build()
        .unwrap();
    session.start().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let message = sms.last_message(PHONE).unwrap();
    assert!(message.message.starts_with("Your OTP is "));
    assert_eq!(message.tag.as_deref(), Some("integration"));

    let sms_code = last_code(&sms, PHONE);
    let email_code = last_code(&email, EMAIL);
    assert_eq!(session.submit_code(ChannelKind::Sms, sms_code).await, Ok(true));
    assert_eq!(session.submit_code(ChannelKind::Email, email_code).await, Ok(true));

    assert_eq!(session.wait_for_outcome().await, Ok(SessionOutcome::Verified));
    assert_eq!(terminal.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_shared_code_survives_failing_email_provider() {
    init_tracing();
    let sms = quiet_mock(ChannelKind::Sms);
    let config = NotifierConfig {
        email_provider: NotifierProvider::Failing,
        console_output: false,
        ..NotifierConfig::default()
    };
    let terminal = Arc::new(AtomicUsize::new(0));

    let session = counting_builder(&terminal)
        .phone(PHONE)
        .email(EMAIL)
        .single_shared_code(true)
        .sms_notifier(notifier(ChannelKind::Sms, sms.clone()))
        .email_notifier(create_notifier(ChannelKind::Email, &config))
        .build()
        .unwrap();
    session.start().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(!session.is_closed());
    let code = last_code(&sms, PHONE);
    assert_eq!(session.submit_code(ChannelKind::Email, code).await, Ok(true));
    assert_eq!(session.outcome(), Some(SessionOutcome::Verified));
}

#[tokio::test]
async fn test_failover_notifier_delivers_through_backup() {
    init_tracing();
    let backup = quiet_mock(ChannelKind::Sms);
    let failover = FailoverMessageService::new(
        Box::new(MockMessageService::with_options(ChannelKind::Sms, false, true)),
        Box::new(Arc::clone(&backup)),
        Duration::from_secs(30),
    );
    let terminal = Arc::new(AtomicUsize::new(0));

    let session = counting_builder(&terminal)
        .phone(PHONE)
        .sms_notifier(notifier(ChannelKind::Sms, failover))
        .build()
        .unwrap();
    session.start().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(backup.get_message_count(), 1);
    let code = last_code(&backup, PHONE);
    assert_eq!(session.submit_code(ChannelKind::Sms, code).await, Ok(true));
    assert_eq!(terminal.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_destination_fails_the_session() {
    init_tracing();
    let terminal = Arc::new(AtomicUsize::new(0));
    let session = counting_builder(&terminal)
        .phone("not-a-phone")
        .sms_notifier(notifier(ChannelKind::Sms, quiet_mock(ChannelKind::Sms)))
        .build()
        .unwrap();
    session.start().unwrap();

    let outcome = session.wait_for_outcome().await.unwrap();
    assert!(matches!(outcome, SessionOutcome::Failed(_)));
    assert_eq!(terminal.load(Ordering::SeqCst), 1);
}
