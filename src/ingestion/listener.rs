use std::sync::Arc;

use futures_util::future::join_all;
use metrics::counter;

use crate::db::CopyStore;
use crate::execution::{CopyOutcome, CopyTradeExecutor};
use crate::solana::ChainClient;

use super::swap_extractor::extract_swap;

/// Turns a signature seen on a watched address into copy trades.
pub struct TransactionListener {
    chain: Arc<dyn ChainClient>,
    store: Arc<dyn CopyStore>,
    executor: Arc<CopyTradeExecutor>,
    swap_program_id: String,
}

impl TransactionListener {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        store: Arc<dyn CopyStore>,
        executor: Arc<CopyTradeExecutor>,
        swap_program_id: String,
    ) -> Self {
        Self {
            chain,
            store,
            executor,
            swap_program_id,
        }
    }

    /// Fetch, classify and fan out one notification. Failures are logged and
    /// the event is dropped; nothing here touches the subscription.
    pub async fn handle_notification(&self, address: &str, signature: &str) -> Vec<CopyOutcome> {
        counter!("chain_notifications_total").increment(1);
        tracing::debug!(address = %address, signature = %signature, "Transaction detected");

        let record = match self.chain.get_parsed_transaction(signature).await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(
                    address = %address,
                    signature = %signature,
                    error = %e,
                    "Failed to fetch transaction, dropping event"
                );
                return Vec::new();
            }
        };

        let Some(event) = extract_swap(&record, &self.swap_program_id) else {
            return Vec::new();
        };

        counter!("swaps_detected_total").increment(1);
        tracing::info!(address = %address, "{event}");

        let followers = match self.store.active_followers(address).await {
            Ok(f) => f,
            Err(e) => {
                tracing::error!(address = %address, error = %e, "Failed to resolve followers");
                return Vec::new();
            }
        };

        if followers.is_empty() {
            tracing::debug!(address = %address, "No active followers for target");
            return Vec::new();
        }

        // Followers are independent; one failure never blocks the others
        join_all(
            followers
                .iter()
                .map(|f| self.executor.copy_for_follower(f, address, &event)),
        )
        .await
    }
}
