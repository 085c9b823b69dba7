use async_trait::async_trait;

use crate::domain::audit::AuditWorkItem;
use crate::error::ApiResult;

/// Message-bus boundary for audit work items.
///
/// Delivery is best effort: the coordinator observes no acknowledgement and a
/// failed publish drops exactly one item. Durable redelivery is the broker's
/// concern, on the consuming side.
#[async_trait]
pub trait AuditPublisher: Send + Sync {
    async fn publish(&self, item: AuditWorkItem) -> ApiResult<()>;
}
