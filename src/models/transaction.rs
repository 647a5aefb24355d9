use rust_decimal::Decimal;

/// Token balance of one account before or after a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBalanceSnapshot {
    pub account_index: u8,
    pub mint: String,
    pub ui_amount: Decimal,
    pub decimals: u8,
}

/// The slice of a confirmed transaction the swap extractor reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionRecord {
    pub signature: String,
    /// Execution error reported by the runtime, if any.
    pub error: Option<String>,
    pub account_keys: Vec<String>,
    pub pre_token_balances: Vec<TokenBalanceSnapshot>,
    pub post_token_balances: Vec<TokenBalanceSnapshot>,
    /// Lamport balances indexed like `account_keys`; index 0 is the fee payer.
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
}

impl TransactionRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn mentions_account(&self, key: &str) -> bool {
        self.account_keys.iter().any(|k| k == key)
    }
}
