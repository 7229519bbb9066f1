//! Unit tests for failover message service

use async_trait::async_trait;
use std::time::{Duration, Instant};

use otp_core::ChannelKind;

use crate::notifier::{FailoverMessageService, MessageService, MockMessageService};
use crate::InfrastructureError;

struct FailingService;

#[async_trait]
impl MessageService for FailingService {
    async fn send_message(
        &self,
        _: &str,
        _: &str,
        _: Option<&str>,
    ) -> Result<String, InfrastructureError> {
        Err(InfrastructureError::Notifier("Service failed".to_string()))
    }

    fn provider_name(&self) -> &str {
        "failing"
    }

    async fn is_available(&self) -> bool {
        false
    }
}

fn quiet_mock() -> Box<MockMessageService> {
    Box::new(MockMessageService::with_options(ChannelKind::Sms, false, false))
}

#[tokio::test]
async fn test_failover_to_backup() {
    let service = FailoverMessageService::new(
        Box::new(FailingService),
        quiet_mock(),
        Duration::from_secs(30),
    );

    let result = service.send_message("+1234567890", "Test message", None).await;
    assert!(result.is_ok());
    assert!(service.is_using_backup().await);
    assert_eq!(service.primary_failure_count().await, 1);

    // Still inside the failover window: the primary is skipped
    service.send_message("+1234567890", "Again", None).await.unwrap();
    assert_eq!(service.primary_failure_count().await, 1);
}

#[tokio::test]
async fn test_primary_recovery() {
    let service = FailoverMessageService::new(quiet_mock(), quiet_mock(), Duration::from_millis(100));
    service
        .force_backup_since(Instant::now() - Duration::from_secs(1))
        .await;

    let result = service.send_message("+1234567890", "Test message", None).await;
    assert!(result.is_ok());
    assert!(!service.is_using_backup().await);
    assert_eq!(service.primary_failure_count().await, 0);
}

#[tokio::test]
async fn test_both_services_fail() {
    let service = FailoverMessageService::new(
        Box::new(FailingService),
        Box::new(FailingService),
        Duration::from_secs(30),
    );

    let result = service.send_message("+1234567890", "Test message", None).await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Both primary and backup"));
}

#[tokio::test]
async fn test_availability_tracks_primary() {
    let service = FailoverMessageService::new(
        Box::new(FailingService),
        quiet_mock(),
        Duration::from_secs(30),
    );

    assert!(service.is_available().await);
    assert!(service.is_using_backup().await);
    assert_eq!(service.provider_name(), "failover");
}
