//! In-process registry of verification sessions owned by the API

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use otp_core::VerificationSession;
use uuid::Uuid;

/// Sessions keyed by id
///
/// Closed sessions stay queryable until `retention` has passed since they
/// closed; see [`SessionRegistry::prune`].
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<VerificationSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Arc<VerificationSession>) -> Uuid {
        let id = session.id();
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, session);
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<VerificationSession>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(Arc::clone)
    }

    pub fn remove(&self, id: &Uuid) -> Option<Arc<VerificationSession>> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions that closed at least `retention` ago
    ///
    /// Returns the number of sessions removed.
    pub fn prune(&self, retention: Duration) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| match session.closed_at() {
            Some(closed_at) => closed_at.elapsed() < retention,
            None => true,
        });
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otp_core::{ChannelKind, VerificationConfig};
    use otp_infra::notifier::{MessageNotifier, MockMessageService};

    const RETENTION: Duration = Duration::from_secs(360);

    fn session() -> Arc<VerificationSession> {
        let session = VerificationSession::builder()
            .phone("+15551234567")
            .sms_notifier(Arc::new(MessageNotifier::new(
                ChannelKind::Sms,
                MockMessageService::with_options(ChannelKind::Sms, false, false),
            )))
            .config(VerificationConfig {
                user_timeout_secs: 7200,
                resend_timeout_secs: 3600,
                ..VerificationConfig::default()
            })
            .on_verified(|| {})
            .on_cancelled(|| {})
            .on_dispatch_failed(|_| {})
            .build()
            .unwrap();
        Arc::new(session)
    }

    async fn close(session: &VerificationSession) {
        session.cancel().await.unwrap();
        session.wait_for_outcome().await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let registry = SessionRegistry::new();
        let session = session();
        let id = registry.insert(Arc::clone(&session));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&id).unwrap().id(), session.id());
        assert!(registry.remove(&id).is_some());
        assert!(registry.get(&id).is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_prune_keeps_open_sessions() {
        let registry = SessionRegistry::new();
        registry.insert(session());

        assert_eq!(registry.prune(Duration::ZERO), 0);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prune_removes_closed_sessions_after_retention() {
        let registry = SessionRegistry::new();
        let session = session();
        let id = registry.insert(Arc::clone(&session));
        session.start().unwrap();
        close(&session).await;

        assert_eq!(registry.prune(RETENTION), 0);
        tokio::time::sleep(RETENTION).await;
        assert_eq!(registry.prune(RETENTION), 1);
        assert!(registry.get(&id).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retention_counts_from_close() {
        let registry = SessionRegistry::new();
        let session = session();
        let id = registry.insert(Arc::clone(&session));
        session.start().unwrap();

        // Open for longer than the retention period before closing.
        tokio::time::sleep(RETENTION + Duration::from_secs(60)).await;
        close(&session).await;

        assert_eq!(registry.prune(RETENTION), 0);
        assert!(registry.get(&id).is_some());

        tokio::time::sleep(RETENTION - Duration::from_secs(1)).await;
        assert_eq!(registry.prune(RETENTION), 0);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(registry.prune(RETENTION), 1);
    }
}
