use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::errors::BotError;

/// External service that quotes and builds unsigned swap transactions.
/// Amounts are in the smallest integer unit of the input asset.
#[async_trait]
pub trait SwapRouter: Send + Sync {
    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        user_public_key: &str,
    ) -> Result<serde_json::Value, BotError>;

    /// Returns the base64-encoded unsigned transaction.
    async fn build(
        &self,
        quote: serde_json::Value,
        payer_public_key: &str,
    ) -> Result<String, BotError>;
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwapResponse {
    swap_transaction: String,
}

/// Jupiter swap API client (`/quote` + `/swap`).
#[derive(Debug, Clone)]
pub struct JupiterClient {
    http: Client,
    base_url: String,
    slippage_bps: u16,
}

impl JupiterClient {
    pub fn new(base_url: String, slippage_bps: u16) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            slippage_bps,
        }
    }
}

fn http_err(context: &str, e: reqwest::Error) -> BotError {
    BotError::ExternalService(format!("{context}: {e}"))
}

#[async_trait]
impl SwapRouter for JupiterClient {
    async fn quote(
        &self,
        input_mint: &str,
        output_mint: &str,
        amount: u64,
        user_public_key: &str,
    ) -> Result<serde_json::Value, BotError> {
        // Mints and keys are base58, so no query escaping is needed
        let url = format!(
            "{}/quote?inputMint={}&outputMint={}&amount={}&slippageBps={}&userPublicKey={}",
            self.base_url, input_mint, output_mint, amount, self.slippage_bps, user_public_key,
        );
        let resp = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| http_err("swap quote", e))?
            .error_for_status()
            .map_err(|e| http_err("swap quote", e))?;

        let quote: serde_json::Value = resp.json().await.map_err(|e| http_err("swap quote", e))?;

        // Jupiter reports routing failures in-band
        if let Some(error) = quote.get("error").and_then(|e| e.as_str()) {
            return Err(BotError::ExternalService(format!("swap quote rejected: {error}")));
        }

        Ok(quote)
    }

    async fn build(
        &self,
        quote: serde_json::Value,
        payer_public_key: &str,
    ) -> Result<String, BotError> {
        let url = format!("{}/swap", self.base_url);
        let body = json!({
            "quoteResponse": quote,
            "payer": payer_public_key,
            "userPublicKey": payer_public_key,
        });

        let resp = self
            .http
            .post(&url)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| http_err("swap build", e))?
            .error_for_status()
            .map_err(|e| http_err("swap build", e))?;

        let swap: SwapResponse = resp.json().await.map_err(|e| http_err("swap build", e))?;
        Ok(swap.swap_transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_response_deserializes() {
        let raw = r#"{"swapTransaction":"AQAB","lastValidBlockHeight":123}"#;
        let resp: SwapResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.swap_transaction, "AQAB");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = JupiterClient::new("https://lite-api.jup.ag/swap/v1/".into(), 50);
        assert_eq!(client.base_url, "https://lite-api.jup.ag/swap/v1");
    }
}
