use rust_decimal::Decimal;
use std::env;
use std::time::Duration;

pub const DEFAULT_SWAP_API_URL: &str = "https://lite-api.jup.ag/swap/v1";

/// Jupiter aggregator v6 program.
pub const DEFAULT_SWAP_PROGRAM_ID: &str = "JUP6LkbZbjS1jKKwapdHNy74zcZ3tLUZoi5QNyVTaV4";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Bearer token for `/api/*`; unset disables auth.
    pub api_token: Option<String>,

    // Solana
    pub solana_rpc_url: String,
    pub solana_ws_url: String,

    // Chat transport (optional, bot runs headless without it)
    pub telegram_bot_token: Option<String>,

    // Swap router
    pub swap_api_url: String,
    pub swap_slippage_bps: u16,
    pub swap_program_id: String,
    pub external_call_timeout_secs: u64,

    // Copy trading
    pub copy_enabled: bool,
    pub default_max_trade_sol: Decimal,

    // Dialog choices
    pub buy_amount_choices: Vec<Decimal>,
    pub percent_choices: Vec<Decimal>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let solana_rpc_url = env::var("SOLANA_RPC_URL")
            .map_err(|_| anyhow::anyhow!("SOLANA_RPC_URL must be set"))?;
        let solana_ws_url = env::var("SOLANA_WS_URL")
            .unwrap_or_else(|_| derive_ws_url(&solana_rpc_url));

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            api_token: env::var("API_TOKEN").ok().filter(|s| !s.is_empty()),

            solana_rpc_url,
            solana_ws_url,

            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN")
                .ok()
                .filter(|s| !s.is_empty()),

            swap_api_url: env::var("SWAP_API_URL")
                .unwrap_or_else(|_| DEFAULT_SWAP_API_URL.into()),
            swap_slippage_bps: env::var("SWAP_SLIPPAGE_BPS")
                .unwrap_or_else(|_| "50".into())
                .parse()
                .unwrap_or(50),
            swap_program_id: env::var("SWAP_PROGRAM_ID")
                .unwrap_or_else(|_| DEFAULT_SWAP_PROGRAM_ID.into()),
            external_call_timeout_secs: env::var("EXTERNAL_CALL_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".into())
                .parse()
                .unwrap_or(20),

            copy_enabled: env::var("COPY_ENABLED")
                .unwrap_or_else(|_| "true".into())
                .parse()
                .unwrap_or(true),
            default_max_trade_sol: env::var("DEFAULT_MAX_TRADE_SOL")
                .unwrap_or_else(|_| "1".into())
                .parse()
                .unwrap_or(Decimal::ONE),

            buy_amount_choices: parse_decimal_list(
                &env::var("BUY_AMOUNT_CHOICES").unwrap_or_default(),
                &[Decimal::new(1, 1), Decimal::new(5, 1), Decimal::ONE],
            ),
            percent_choices: parse_decimal_list(
                &env::var("PERCENT_CHOICES").unwrap_or_default(),
                &[Decimal::from(25), Decimal::from(50), Decimal::ONE_HUNDRED],
            ),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the copy engine cannot honour.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_max_trade_sol <= Decimal::ZERO {
            anyhow::bail!("DEFAULT_MAX_TRADE_SOL must be positive");
        }
        if self.swap_slippage_bps > 10_000 {
            anyhow::bail!("SWAP_SLIPPAGE_BPS must be at most 10000");
        }
        if self.buy_amount_choices.iter().any(|a| *a <= Decimal::ZERO) {
            anyhow::bail!("BUY_AMOUNT_CHOICES must all be positive");
        }
        if self
            .percent_choices
            .iter()
            .any(|p| *p <= Decimal::ZERO || *p > Decimal::ONE_HUNDRED)
        {
            anyhow::bail!("PERCENT_CHOICES must lie in (0, 100]");
        }
        Ok(())
    }

    pub fn has_telegram(&self) -> bool {
        self.telegram_bot_token.is_some()
    }

    pub fn external_call_timeout(&self) -> Duration {
        Duration::from_secs(self.external_call_timeout_secs)
    }
}

/// `https://host` → `wss://host`, `http://host` → `ws://host`.
fn derive_ws_url(rpc_url: &str) -> String {
    if let Some(rest) = rpc_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = rpc_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        rpc_url.to_string()
    }
}

/// Parse a comma-separated list, falling back to `default` when nothing parses.
fn parse_decimal_list(raw: &str, default: &[Decimal]) -> Vec<Decimal> {
    let parsed: Vec<Decimal> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();

    if parsed.is_empty() {
        default.to_vec()
    } else {
        parsed
    }
}
