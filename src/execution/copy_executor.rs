use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::counter;
use rust_decimal::Decimal;
use solana_sdk::signature::Signature;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::BotError;
use crate::models::{Follower, SwapEvent, User};
use crate::services::notifier::{self, ChatNotifier};
use crate::solana::CustodialWallet;

use super::position_sizer::{scale_copy_amount, to_smallest_unit};
use super::swap_executor::SwapExecutor;

/// How long a (signature, follower) claim is remembered.
const ATTEMPT_RETENTION: Duration = Duration::from_secs(30 * 60);

/// Result of one follower's copy of one source swap.
#[derive(Debug, Clone, PartialEq)]
pub enum CopyOutcome {
    Submitted(Signature),
    Failed(BotError),
    /// This follower already had an attempt for the same signature.
    Duplicate,
}

/// Mirrors detected swaps into follower wallets.
pub struct CopyTradeExecutor {
    swaps: Arc<SwapExecutor>,
    notifier: Arc<dyn ChatNotifier>,
    attempts: Mutex<HashMap<(String, Uuid), Instant>>,
}

impl CopyTradeExecutor {
    pub fn new(swaps: Arc<SwapExecutor>, notifier: Arc<dyn ChatNotifier>) -> Self {
        Self {
            swaps,
            notifier,
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// Scale `event` for one follower, then build, sign and submit it.
    pub async fn execute(
        &self,
        follower: &User,
        event: &SwapEvent,
        copy_percentage: Decimal,
        max_trade_amount: Decimal,
    ) -> Result<Signature, BotError> {
        let amount = scale_copy_amount(
            event.input_amount,
            event.input_is_native(),
            copy_percentage,
            max_trade_amount,
        );
        let units = to_smallest_unit(amount, event.input_decimals)?;

        tracing::info!(
            follower = %follower.id,
            signature = %event.signature,
            amount = %amount,
            units,
            "Executing copy trade"
        );

        let wallet = CustodialWallet::from_user(follower);
        self.swaps
            .swap(&wallet, &event.input_mint, &event.output_mint, units)
            .await
    }

    /// Run one follower's copy end to end. Never fails: the outcome is
    /// reported to that follower exactly once and returned.
    pub async fn copy_for_follower(
        &self,
        follower: &Follower,
        target: &str,
        event: &SwapEvent,
    ) -> CopyOutcome {
        let user = &follower.user;
        let config = &follower.config;

        if !self.claim(&event.signature, user.id).await {
            tracing::debug!(
                follower = %user.id,
                signature = %event.signature,
                "Copy already attempted for this signature, skipping"
            );
            return CopyOutcome::Duplicate;
        }

        self.notifier
            .send_text(user.chat_id, &notifier::format_trade_detected(target, event))
            .await;

        match self
            .execute(user, event, config.copy_percentage, config.max_trade_amount)
            .await
        {
            Ok(signature) => {
                counter!("copy_trades_executed").increment(1);
                tracing::info!(
                    follower = %user.id,
                    source = %event.signature,
                    signature = %signature,
                    "Copy trade successful"
                );

                let amount = scale_copy_amount(
                    event.input_amount,
                    event.input_is_native(),
                    config.copy_percentage,
                    config.max_trade_amount,
                );
                let msg = notifier::format_copy_success(
                    amount,
                    event,
                    config.copy_percentage,
                    &signature.to_string(),
                );
                self.notifier.send_text(user.chat_id, &msg).await;
                CopyOutcome::Submitted(signature)
            }
            Err(e) => {
                counter!("copy_trades_failed").increment(1);
                tracing::error!(
                    follower = %user.id,
                    source = %event.signature,
                    error = %e,
                    "Copy trade execution failed"
                );

                let msg = notifier::format_copy_failure(&e.to_string());
                self.notifier.send_text(user.chat_id, &msg).await;
                CopyOutcome::Failed(e)
            }
        }
    }

    /// Record an attempt; false if the pair was already claimed.
    async fn claim(&self, signature: &str, follower_id: Uuid) -> bool {
        let mut attempts = self.attempts.lock().await;
        let now = Instant::now();
        attempts.retain(|_, at| now.duration_since(*at) < ATTEMPT_RETENTION);

        let key = (signature.to_string(), follower_id);
        if attempts.contains_key(&key) {
            return false;
        }
        attempts.insert(key, now);
        true
    }
}
