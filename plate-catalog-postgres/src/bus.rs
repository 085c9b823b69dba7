use async_trait::async_trait;
use plate_catalog_api::domain::audit::AuditWorkItem;
use plate_catalog_api::error::{ApiError, ApiResult};
use plate_catalog_api::service::publisher::AuditPublisher;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const REDELIVERY_DELAY: Duration = Duration::from_millis(100);

/// Handles one delivered audit work item.
///
/// The bus owns delivery policy (redelivery, dead-lettering); implementations
/// own what a delivery means. A returned error asks for redelivery.
#[async_trait]
pub trait AuditWorkHandler: Send + Sync {
    async fn handle(
        &self,
        item: &AuditWorkItem,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// In-process message bus between the audit interceptor and the consumer.
///
/// Publishing enqueues onto an unbounded channel and returns immediately; the
/// handler loop runs on its own task. A failed handling attempt is redelivered
/// up to `max_attempts` times (at-least-once), after which the item is
/// dead-lettered with a warning. Dropping every bus handle closes the channel
/// and lets the loop drain and stop.
#[derive(Clone)]
pub struct InProcessAuditBus {
    tx: mpsc::UnboundedSender<AuditWorkItem>,
}

impl InProcessAuditBus {
    pub fn start(
        handler: Arc<dyn AuditWorkHandler>,
        max_attempts: u32,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<AuditWorkItem>();

        let handle = tokio::spawn(async move {
            while let Some(item) = rx.recv().await {
                let mut attempt = 0;
                loop {
                    match handler.handle(&item).await {
                        Ok(()) => break,
                        Err(_) => {
                            attempt += 1;
                            if attempt >= max_attempts {
                                tracing::warn!(
                                    plate_id = %item.plate_id,
                                    attempts = attempt,
                                    "dead-lettering audit work item"
                                );
                                break;
                            }
                            tokio::time::sleep(REDELIVERY_DELAY).await;
                        }
                    }
                }
            }
        });

        (Self { tx }, handle)
    }
}

#[async_trait]
impl AuditPublisher for InProcessAuditBus {
    async fn publish(&self, item: AuditWorkItem) -> ApiResult<()> {
        self.tx
            .send(item)
            .map_err(|e| ApiError::InternalError(format!("audit bus closed: {e}")))
    }
}
