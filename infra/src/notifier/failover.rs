//! Failover Message Service
//!
//! Sends through a primary provider and falls back to a backup provider
//! when the primary fails. After a failure the backup is used until the
//! failover timeout has passed, then the primary is tried again.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::MessageService;
use crate::InfrastructureError;

/// State tracking for failover service
#[derive(Debug, Clone, Default)]
struct FailoverState {
    /// Whether we're currently using the backup service
    using_backup: bool,
    /// When the primary service last failed
    last_primary_failure: Option<Instant>,
    /// Number of consecutive failures on primary
    primary_failure_count: u32,
}

/// Message service with automatic failover capability
pub struct FailoverMessageService {
    primary: Box<dyn MessageService>,
    backup: Box<dyn MessageService>,
    state: Arc<RwLock<FailoverState>>,
    /// How long to stay on the backup before retrying the primary
    failover_timeout: Duration,
}

impl FailoverMessageService {
    pub fn new(
        primary: Box<dyn MessageService>,
        backup: Box<dyn MessageService>,
        failover_timeout: Duration,
    ) -> Self {
        info!(
            "Initializing failover notifier with {} (primary) and {} (backup)",
            primary.provider_name(),
            backup.provider_name()
        );

        Self {
            primary,
            backup,
            state: Arc::new(RwLock::new(FailoverState::default())),
            failover_timeout,
        }
    }

    /// Whether sends currently go to the backup
    pub async fn is_using_backup(&self) -> bool {
        self.state.read().await.using_backup
    }

    /// Consecutive primary failures since the last primary success
    pub async fn primary_failure_count(&self) -> u32 {
        self.state.read().await.primary_failure_count
    }

    async fn should_retry_primary(&self) -> bool {
        let state = self.state.read().await;

        if !state.using_backup {
            return true;
        }

        match state.last_primary_failure {
            Some(last_failure) => last_failure.elapsed() > self.failover_timeout,
            None => true,
        }
    }

    async fn record_primary_failure(&self) {
        let mut state = self.state.write().await;

        state.primary_failure_count += 1;
        state.last_primary_failure = Some(Instant::now());

        if !state.using_backup {
            warn!(
                "Primary notifier ({}) failed, switching to backup ({})",
                self.primary.provider_name(),
                self.backup.provider_name()
            );
            state.using_backup = true;
        }
    }

    async fn record_primary_success(&self) {
        let mut state = self.state.write().await;

        if state.using_backup {
            info!(
                "Primary notifier ({}) recovered, switching back from backup",
                self.primary.provider_name()
            );
        }

        *state = FailoverState::default();
    }

    #[cfg(test)]
    pub(crate) async fn force_backup_since(&self, failed_at: Instant) {
        let mut state = self.state.write().await;
        state.using_backup = true;
        state.last_primary_failure = Some(failed_at);
    }
}

#[async_trait]
impl MessageService for FailoverMessageService {
    async fn send_message(
        &self,
        destination: &str,
        message: &str,
        tag: Option<&str>,
    ) -> Result<String, InfrastructureError> {
        if self.should_retry_primary().await {
            match self.primary.send_message(destination, message, tag).await {
                Ok(message_id) => {
                    self.record_primary_success().await;
                    return Ok(message_id);
                }
                Err(e) => {
                    error!(
                        "Primary notifier ({}) failed: {}",
                        self.primary.provider_name(),
                        e
                    );
                    self.record_primary_failure().await;
                }
            }
        }

        info!(
            "Using backup notifier ({}) to send message",
            self.backup.provider_name()
        );

        self.backup
            .send_message(destination, message, tag)
            .await
            .map_err(|e| {
                error!(
                    "Backup notifier ({}) also failed: {}",
                    self.backup.provider_name(),
                    e
                );
                InfrastructureError::Notifier(format!(
                    "Both primary and backup notifiers failed. Primary: {}, Backup: {}",
                    self.primary.provider_name(),
                    self.backup.provider_name()
                ))
            })
    }

    fn provider_name(&self) -> &str {
        "failover"
    }

    async fn is_available(&self) -> bool {
        let primary_available = self.primary.is_available().await;
        let backup_available = self.backup.is_available().await;

        if !primary_available && backup_available {
            self.record_primary_failure().await;
        } else if primary_available {
            self.record_primary_success().await;
        }

        primary_available || backup_available
    }
}
