use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    clients::LedgerClient,
    error::LedgerError,
    models::{payload::escape_html, reward::RewardEvent},
};

/// Best-effort, at-most-once submission of reward events. Failures are
/// logged and dropped; nothing is retried or queued.
#[derive(Clone)]
pub struct RewardPublisher {
    ledger: Arc<dyn LedgerClient>,
}

impl RewardPublisher {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Spawns the submission and returns immediately.
    pub fn publish(&self, event: RewardEvent) -> JoinHandle<()> {
        let publisher = self.clone();
        tokio::spawn(async move {
            let _ = publisher.submit(&event).await;
        })
    }

    pub async fn submit(&self, event: &RewardEvent) -> Result<(), LedgerError> {
        match self.ledger.post_event(event).await {
            Ok(ack) => {
                info!(
                    trace_id = %event.trace_id,
                    user_id = %escape_html(&event.user_id),
                    points = event.points,
                    ack = %ack,
                    "Karma event logged successfully"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    trace_id = %event.trace_id,
                    user_id = %escape_html(&event.user_id),
                    error = %e,
                    "Failed to log karma event"
                );
                Err(e)
            }
        }
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }
}
