use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{is_native_mint, mint_symbol, short_address};

/// A single-hop swap observed on a target wallet. Amounts are in UI units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapEvent {
    pub signature: String,
    pub input_mint: String,
    pub output_mint: String,
    pub input_amount: Decimal,
    pub output_amount: Decimal,
    pub input_decimals: u8,
    pub output_decimals: u8,
}

impl SwapEvent {
    pub fn input_is_native(&self) -> bool {
        is_native_mint(&self.input_mint)
    }

    pub fn input_symbol(&self) -> &'static str {
        mint_symbol(&self.input_mint)
    }

    pub fn output_symbol(&self) -> &'static str {
        mint_symbol(&self.output_mint)
    }
}

impl fmt::Display for SwapEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Swap: sig={} in={} {} out={} {}",
            short_address(&self.signature),
            self.input_amount,
            short_address(&self.input_mint),
            self.output_amount,
            short_address(&self.output_mint),
        )
    }
}
