use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use solana_sdk::signature::Signature;

use crate::errors::BotError;
use crate::solana::{ChainClient, CustodialWallet, SwapRouter};

/// Quote → build → sign → submit, once, with each external call bounded by
/// a timeout. Only the submission signature is awaited.
pub struct SwapExecutor {
    router: Arc<dyn SwapRouter>,
    chain: Arc<dyn ChainClient>,
    call_timeout: Duration,
}

impl SwapExecutor {
    pub fn new(router: Arc<dyn SwapRouter>, chain: Arc<dyn ChainClient>, call_timeout: Duration) -> Self {
        Self {
            router,
            chain,
            call_timeout,
        }
    }

    pub fn chain(&self) -> &Arc<dyn ChainClient> {
        &self.chain
    }

    pub async fn swap(
        &self,
        wallet: &CustodialWallet,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
    ) -> Result<Signature, BotError> {
        if amount == 0 {
            return Err(BotError::Validation("Trade amount rounds down to zero".into()));
        }

        tracing::info!(
            wallet = %wallet.public_key(),
            input_mint,
            output_mint,
            amount,
            "Requesting swap"
        );

        let quote = self
            .bounded(
                "swap quote",
                self.router
                    .quote(input_mint, output_mint, amount, wallet.public_key()),
            )
            .await?;

        let unsigned = self
            .bounded("swap build", self.router.build(quote, wallet.public_key()))
            .await?;

        let signed = wallet.sign_transaction(&unsigned)?;

        let signature = self
            .bounded("transaction submit", self.chain.send_transaction(&signed))
            .await?;

        tracing::info!(signature = %signature, "Swap submitted");
        Ok(signature)
    }

    async fn bounded<T>(
        &self,
        what: &str,
        fut: impl Future<Output = Result<T, BotError>>,
    ) -> Result<T, BotError> {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(BotError::ExternalService(format!(
                "{what} timed out after {}s",
                self.call_timeout.as_secs()
            ))),
        }
    }
}
