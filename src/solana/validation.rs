use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;

use crate::errors::BotError;

use super::rpc::ChainClient;

fn parse_address(address: &str) -> Result<Pubkey, BotError> {
    Pubkey::from_str(address.trim())
        .map_err(|_| BotError::Validation("Invalid Solana address format".into()))
}

/// Check that `address` is a live wallet worth copying.
///
/// The address must be an on-curve key with an account and at least one
/// signature. A zero SOL balance is allowed but logged.
pub async fn validate_target_wallet(
    chain: &dyn ChainClient,
    address: &str,
    own_public_key: &str,
) -> Result<Pubkey, BotError> {
    let pubkey = parse_address(address)?;

    if !pubkey.is_on_curve() {
        return Err(BotError::Validation("Invalid Solana address format".into()));
    }
    if pubkey.to_string() == own_public_key {
        return Err(BotError::Validation("You cannot copy your own wallet".into()));
    }
    if !chain.account_exists(&pubkey).await? {
        return Err(BotError::Validation("Wallet has no on-chain activity".into()));
    }
    if !chain.has_transaction_history(&pubkey).await? {
        return Err(BotError::Validation("Wallet has no transaction history".into()));
    }

    match chain.get_balance(&pubkey).await {
        Ok(0) => tracing::warn!(address = %pubkey, "Target wallet has 0 SOL balance"),
        Ok(_) => {}
        Err(e) => tracing::warn!(address = %pubkey, error = %e, "Could not read target balance"),
    }

    Ok(pubkey)
}

/// A mint is valid when it parses and its account exists.
pub async fn validate_token_mint(chain: &dyn ChainClient, mint: &str) -> Result<Pubkey, BotError> {
    let pubkey = parse_address(mint)
        .map_err(|_| BotError::Validation("Invalid token address".into()))?;

    if !chain.account_exists(&pubkey).await? {
        return Err(BotError::Validation("Token not found on-chain".into()));
    }

    Ok(pubkey)
}
