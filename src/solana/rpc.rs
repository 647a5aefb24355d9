use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiMessage,
    UiTransactionEncoding, UiTransactionTokenBalance,
};

use crate::errors::BotError;
use crate::models::{TokenBalanceSnapshot, TokenHolding, TransactionRecord};

use super::TOKEN_PROGRAM_ID;

/// Chain RPC operations used by the bot.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Fetch a confirmed transaction in parsed form.
    async fn get_parsed_transaction(&self, signature: &str) -> Result<TransactionRecord, BotError>;

    async fn send_transaction(&self, tx: &VersionedTransaction) -> Result<Signature, BotError>;

    /// Balance in lamports.
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, BotError>;

    async fn account_exists(&self, address: &Pubkey) -> Result<bool, BotError>;

    async fn has_transaction_history(&self, address: &Pubkey) -> Result<bool, BotError>;

    /// Non-empty SPL token accounts owned by `owner`.
    async fn token_accounts(&self, owner: &Pubkey) -> Result<Vec<TokenHolding>, BotError>;
}

fn rpc_err(context: &str, e: impl std::fmt::Display) -> BotError {
    BotError::ExternalService(format!("{context}: {e}"))
}

/// `ChainClient` backed by the nonblocking Solana JSON-RPC client.
pub struct SolanaRpc {
    client: RpcClient,
}

impl SolanaRpc {
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed()),
        }
    }
}

#[async_trait]
impl ChainClient for SolanaRpc {
    async fn get_parsed_transaction(&self, signature: &str) -> Result<TransactionRecord, BotError> {
        let sig = Signature::from_str(signature)
            .map_err(|e| BotError::Validation(format!("bad signature {signature}: {e}")))?;

        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };

        let tx = self
            .client
            .get_transaction_with_config(&sig, config)
            .await
            .map_err(|e| rpc_err("getTransaction", e))?;

        to_transaction_record(signature, &tx)
    }

    async fn send_transaction(&self, tx: &VersionedTransaction) -> Result<Signature, BotError> {
        self.client
            .send_transaction(tx)
            .await
            .map_err(|e| rpc_err("sendTransaction", e))
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, BotError> {
        self.client
            .get_balance(address)
            .await
            .map_err(|e| rpc_err("getBalance", e))
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool, BotError> {
        let response = self
            .client
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await
            .map_err(|e| rpc_err("getAccountInfo", e))?;

        Ok(response.value.is_some())
    }

    async fn has_transaction_history(&self, address: &Pubkey) -> Result<bool, BotError> {
        let config = GetConfirmedSignaturesForAddress2Config {
            limit: Some(1),
            ..Default::default()
        };

        let signatures = self
            .client
            .get_signatures_for_address_with_config(address, config)
            .await
            .map_err(|e| rpc_err("getSignaturesForAddress", e))?;

        Ok(!signatures.is_empty())
    }

    async fn token_accounts(&self, owner: &Pubkey) -> Result<Vec<TokenHolding>, BotError> {
        let accounts = self
            .client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(TOKEN_PROGRAM_ID))
            .await
            .map_err(|e| rpc_err("getTokenAccountsByOwner", e))?;

        let mut holdings = Vec::with_capacity(accounts.len());
        for keyed in accounts {
            let data = serde_json::to_value(&keyed.account.data)
                .map_err(|e| rpc_err("token account encoding", e))?;
            if let Some(holding) = parse_token_account(&data) {
                if holding.amount > Decimal::ZERO {
                    holdings.push(holding);
                }
            }
        }

        Ok(holdings)
    }
}

/// Read `{parsed: {info: {mint, tokenAmount}}}` out of a jsonParsed token account.
fn parse_token_account(data: &serde_json::Value) -> Option<TokenHolding> {
    let info = data.get("parsed")?.get("info")?;
    let mint = info.get("mint")?.as_str()?.to_string();
    let token_amount = info.get("tokenAmount")?;
    let decimals = token_amount.get("decimals")?.as_u64()? as u8;
    let amount = token_amount
        .get("uiAmountString")
        .and_then(|v| v.as_str())
        .and_then(|s| Decimal::from_str(s).ok())
        .or_else(|| {
            token_amount
                .get("uiAmount")
                .and_then(|v| v.as_f64())
                .and_then(|f| Decimal::try_from(f).ok())
        })
        .unwrap_or(Decimal::ZERO);

    Some(TokenHolding {
        mint,
        amount,
        decimals,
    })
}

fn to_snapshots(balances: &OptionSerializer<Vec<UiTransactionTokenBalance>>) -> Vec<TokenBalanceSnapshot> {
    match balances {
        OptionSerializer::Some(list) => list
            .iter()
            .map(|b| TokenBalanceSnapshot {
                account_index: b.account_index,
                mint: b.mint.clone(),
                ui_amount: Decimal::from_str(&b.ui_token_amount.ui_amount_string)
                    .ok()
                    .or_else(|| {
                        b.ui_token_amount
                            .ui_amount
                            .and_then(|f| Decimal::try_from(f).ok())
                    })
                    .unwrap_or(Decimal::ZERO),
                decimals: b.ui_token_amount.decimals,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Flatten an RPC transaction into the record the extractor understands.
pub fn to_transaction_record(
    signature: &str,
    tx: &EncodedConfirmedTransactionWithStatusMeta,
) -> Result<TransactionRecord, BotError> {
    let meta = tx
        .transaction
        .meta
        .as_ref()
        .ok_or_else(|| BotError::ExternalService(format!("transaction {signature} has no meta")))?;

    let account_keys = match &tx.transaction.transaction {
        EncodedTransaction::Json(ui_tx) => match &ui_tx.message {
            UiMessage::Parsed(msg) => msg.account_keys.iter().map(|k| k.pubkey.clone()).collect(),
            UiMessage::Raw(msg) => msg.account_keys.clone(),
        },
        _ => {
            return Err(BotError::ExternalService(format!(
                "transaction {signature} returned in an unsupported encoding"
            )))
        }
    };

    Ok(TransactionRecord {
        signature: signature.to_string(),
        error: meta.err.as_ref().map(|e| format!("{e:?}")),
        account_keys,
        pre_token_balances: to_snapshots(&meta.pre_token_balances),
        post_token_balances: to_snapshots(&meta.post_token_balances),
        pre_balances: meta.pre_balances.clone(),
        post_balances: meta.post_balances.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_token_account() {
        let data = json!({
            "program": "spl-token",
            "parsed": {
                "type": "account",
                "info": {
                    "mint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
                    "owner": "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin",
                    "tokenAmount": {
                        "amount": "12500000",
                        "decimals": 6,
                        "uiAmount": 12.5,
                        "uiAmountString": "12.5"
                    }
                }
            },
            "space": 165
        });

        let holding = parse_token_account(&data).expect("should parse");
        assert_eq!(holding.mint, "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
        assert_eq!(holding.amount, Decimal::new(125, 1));
        assert_eq!(holding.decimals, 6);
    }

    #[test]
    fn test_parse_token_account_rejects_binary() {
        let data = json!(["AAAA", "base64"]);
        assert!(parse_token_account(&data).is_none());
    }
}
