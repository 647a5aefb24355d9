pub mod swap;
pub mod transaction;
pub mod user;

pub use swap::SwapEvent;
pub use transaction::{TokenBalanceSnapshot, TransactionRecord};
pub use user::{CopySettings, Follower, FollowerCopyConfig, TargetWallet, User};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wrapped SOL mint; the swap router uses it to denote the native asset.
pub const NATIVE_MINT: &str = "So11111111111111111111111111111111111111112";

/// Lamports per SOL expressed as a decimal exponent.
pub const NATIVE_DECIMALS: u8 = 9;

pub fn is_native_mint(mint: &str) -> bool {
    mint == NATIVE_MINT
}

/// Display symbol used in notifications.
pub fn mint_symbol(mint: &str) -> &'static str {
    if is_native_mint(mint) {
        "SOL"
    } else {
        "TOKEN"
    }
}

// ---------------------------------------------------------------------------
// TradeAction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "buy"),
            TradeAction::Sell => write!(f, "sell"),
        }
    }
}

// ---------------------------------------------------------------------------
// TokenHolding: one line of a wallet portfolio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenHolding {
    pub mint: String,
    pub amount: Decimal,
    pub decimals: u8,
}

/// Shorten an address to `first8...last8` for chat output.
pub fn short_address(address: &str) -> String {
    if address.len() > 16 {
        format!("{}...{}", &address[..8], &address[address.len() - 8..])
    } else {
        address.to_string()
    }
}
