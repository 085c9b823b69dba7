use chrono::Utc;
use parking_lot::Mutex as SyncMutex;
use plate_catalog_api::domain::audit::AuditWorkItem;
use plate_catalog_api::domain::classify::classify;
use plate_catalog_api::domain::diff::diff_plate;
use plate_catalog_api::service::current_user::CurrentUserService;
use plate_catalog_api::service::publisher::AuditPublisher;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::unit_of_work::ChangeTracker;

/// Intercepts plate writes, diffs the tracked snapshots and hands the result
/// to the publisher after the commit succeeds.
///
/// Pending work items are held in an explicit map keyed by transaction id,
/// inserted at capture and removed at flush or discard. The buffer holds no
/// reference to the transaction itself.
pub struct PlateAuditInterceptor {
    publisher: Arc<dyn AuditPublisher>,
    current_user: Arc<dyn CurrentUserService>,
    pending: SyncMutex<HashMap<Uuid, Vec<AuditWorkItem>>>,
}

impl PlateAuditInterceptor {
    pub fn new(
        publisher: Arc<dyn AuditPublisher>,
        current_user: Arc<dyn CurrentUserService>,
    ) -> Self {
        Self {
            publisher,
            current_user,
            pending: SyncMutex::new(HashMap::new()),
        }
    }

    /// Pre-commit hook: diff every modified plate in the transaction, classify
    /// the non-empty change sets and buffer the resulting work items.
    ///
    /// Must never abort the underlying business commit: any failure in here
    /// (including the caller-identity lookup) is logged and swallowed, at the
    /// cost of losing this transaction's audit trail.
    pub fn capture(&self, tx_id: Uuid, tracker: &SyncMutex<ChangeTracker>) {
        if let Err(e) = self.try_capture(tx_id, tracker) {
            tracing::error!(error = %e, "failed to capture audit changes");
        }
    }

    fn try_capture(
        &self,
        tx_id: Uuid,
        tracker: &SyncMutex<ChangeTracker>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let user_id = self.current_user.get_user_id_or_default()?;
        let now = Utc::now();

        let mut items = Vec::new();
        for (original, current) in tracker.lock().modified_snapshots() {
            let changes = diff_plate(&original, &current);
            if changes.is_empty() {
                continue;
            }

            let status = classify(&changes);
            items.push(AuditWorkItem {
                plate_id: current.id,
                user_id,
                timestamp_utc: now,
                status,
                changes,
            });
        }

        if !items.is_empty() {
            self.pending.lock().insert(tx_id, items);
        }
        Ok(())
    }

    /// Post-commit hook: pop the buffer for the committed transaction and
    /// publish each item without waiting for the result. A failed publish
    /// loses that one item; the failure is logged, never propagated.
    pub fn flush(&self, tx_id: Uuid) {
        let Some(items) = self.pending.lock().remove(&tx_id) else {
            return;
        };

        for item in items {
            let publisher = Arc::clone(&self.publisher);
            tokio::spawn(async move {
                let plate_id = item.plate_id;
                if let Err(e) = publisher.publish(item).await {
                    tracing::error!(%plate_id, error = %e, "failed to publish audit event");
                }
            });
        }
    }

    /// Drop any buffered items for a transaction that did not commit.
    pub fn discard(&self, tx_id: Uuid) {
        self.pending.lock().remove(&tx_id);
    }

    /// Whether the buffer currently holds items for the given transaction.
    pub fn has_pending(&self, tx_id: Uuid) -> bool {
        self.pending.lock().contains_key(&tx_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helper::{CollectingPublisher, FailingCurrentUser, FailingPublisher};
    use std::sync::atomic::Ordering;
    use plate_catalog_api::domain::audit::AuditAction;
    use plate_catalog_api::domain::plate::Plate;
    use plate_catalog_api::service::current_user::FixedCurrentUser;
    use rust_decimal::Decimal;
    use std::time::Duration;

    fn tracker_with_reserved_plate() -> (SyncMutex<ChangeTracker>, Uuid) {
        let plate = Plate::new("AB12 CDE", "ABC", 12, Decimal::from(100)).unwrap();
        let plate_id = plate.id;

        let mut tracker = ChangeTracker::default();
        tracker.track(&plate);

        let mut reserved = plate;
        reserved.reserve().unwrap();
        tracker.mark_modified(&reserved);

        (SyncMutex::new(tracker), plate_id)
    }

    #[tokio::test]
    async fn capture_then_flush_publishes_classified_item() {
        let publisher = Arc::new(CollectingPublisher::default());
        let user_id = Uuid::new_v4();
        let interceptor = PlateAuditInterceptor::new(
            publisher.clone(),
            Arc::new(FixedCurrentUser(user_id)),
        );

        let (tracker, plate_id) = tracker_with_reserved_plate();
        let tx_id = Uuid::new_v4();

        interceptor.capture(tx_id, &tracker);
        assert!(interceptor.has_pending(tx_id));

        interceptor.flush(tx_id);
        assert!(!interceptor.has_pending(tx_id));

        tokio::time::sleep(Duration::from_millis(50)).await;
        let items = publisher.items.lock().clone();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].plate_id, plate_id);
        assert_eq!(items[0].user_id, user_id);
        assert_eq!(items[0].status, AuditAction::PlateReserved);
        assert!(!items[0].changes.is_empty());
    }

    #[tokio::test]
    async fn zero_delta_transaction_buffers_nothing() {
        let publisher = Arc::new(CollectingPublisher::default());
        let interceptor = PlateAuditInterceptor::new(
            publisher.clone(),
            Arc::new(FixedCurrentUser(Uuid::new_v4())),
        );

        let plate = Plate::new("AB12 CDE", "ABC", 12, Decimal::from(100)).unwrap();
        let mut tracker = ChangeTracker::default();
        tracker.track(&plate);
        // Written back unchanged: modified lifecycle state, zero net deltas.
        tracker.mark_modified(&plate);
        let tracker = SyncMutex::new(tracker);

        let tx_id = Uuid::new_v4();
        interceptor.capture(tx_id, &tracker);
        assert!(!interceptor.has_pending(tx_id));

        interceptor.flush(tx_id);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(publisher.items.lock().is_empty());
    }

    #[tokio::test]
    async fn identity_lookup_failure_swallows_capture_and_publishes_nothing() {
        let publisher = Arc::new(CollectingPublisher::default());
        let interceptor =
            PlateAuditInterceptor::new(publisher.clone(), Arc::new(FailingCurrentUser));

        let (tracker, _) = tracker_with_reserved_plate();
        let tx_id = Uuid::new_v4();

        // Does not panic or propagate; the business write would proceed.
        interceptor.capture(tx_id, &tracker);
        assert!(!interceptor.has_pending(tx_id));

        interceptor.flush(tx_id);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(publisher.items.lock().is_empty());
    }

    #[tokio::test]
    async fn discard_drops_buffered_items_without_publishing() {
        let publisher = Arc::new(CollectingPublisher::default());
        let interceptor = PlateAuditInterceptor::new(
            publisher.clone(),
            Arc::new(FixedCurrentUser(Uuid::new_v4())),
        );

        let (tracker, _) = tracker_with_reserved_plate();
        let tx_id = Uuid::new_v4();

        interceptor.capture(tx_id, &tracker);
        assert!(interceptor.has_pending(tx_id));

        interceptor.discard(tx_id);
        interceptor.flush(tx_id);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(publisher.items.lock().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_drops_the_item_without_retry() {
        let publisher = Arc::new(FailingPublisher::default());
        let interceptor = PlateAuditInterceptor::new(
            publisher.clone(),
            Arc::new(FixedCurrentUser(Uuid::new_v4())),
        );

        let (tracker, _) = tracker_with_reserved_plate();
        let tx_id = Uuid::new_v4();

        interceptor.capture(tx_id, &tracker);
        assert!(interceptor.has_pending(tx_id));

        // Flush drains the buffer whether or not the publish lands.
        interceptor.flush(tx_id);
        assert!(!interceptor.has_pending(tx_id));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(publisher.attempts.load(Ordering::SeqCst), 1);

        // The failed item is gone; a second flush has nothing to resend.
        interceptor.flush(tx_id);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(publisher.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn flush_for_unknown_transaction_is_a_no_op() {
        let publisher = Arc::new(CollectingPublisher::default());
        let interceptor = PlateAuditInterceptor::new(
            publisher.clone(),
            Arc::new(FixedCurrentUser(Uuid::new_v4())),
        );

        interceptor.flush(Uuid::new_v4());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(publisher.items.lock().is_empty());
    }
}
