pub mod pubsub;
pub mod rpc;
pub mod swap_router;
pub mod validation;
pub mod wallet;

pub use pubsub::{PubsubFeed, SignatureFeed};
pub use rpc::{ChainClient, SolanaRpc};
pub use swap_router::{JupiterClient, SwapRouter};
pub use validation::{validate_target_wallet, validate_token_mint};
pub use wallet::CustodialWallet;

use rust_decimal::Decimal;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

use crate::errors::BotError;
use crate::models::{TokenHolding, NATIVE_DECIMALS, NATIVE_MINT};

/// SPL Token program.
pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL)
}

/// Native SOL (as the wrapped mint) followed by every non-empty token account.
pub async fn wallet_holdings(
    chain: &dyn ChainClient,
    owner: &Pubkey,
) -> Result<Vec<TokenHolding>, BotError> {
    let lamports = chain.get_balance(owner).await?;
    let mut holdings = vec![TokenHolding {
        mint: NATIVE_MINT.to_string(),
        amount: lamports_to_sol(lamports),
        decimals: NATIVE_DECIMALS,
    }];
    holdings.extend(chain.token_accounts(owner).await?);
    Ok(holdings)
}
