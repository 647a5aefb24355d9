use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{short_address, SwapEvent};

/// Delivers a text notification to a chat. Failures are logged by the
/// implementation and never bubble into the trading flow.
#[async_trait]
pub trait ChatNotifier: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str);
}

/// Used when no chat transport is configured.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl ChatNotifier for LogNotifier {
    async fn send_text(&self, chat_id: i64, text: &str) {
        tracing::info!(chat_id, text, "Notification (no chat transport)");
    }
}

/// Escape text interpolated into a legacy-Markdown message so Telegram
/// does not read it as formatting.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn solscan_tx_url(signature: &str) -> String {
    format!("https://solscan.io/tx/{signature}")
}

/// Sent to a follower before their copy is attempted.
pub fn format_trade_detected(target: &str, event: &SwapEvent) -> String {
    format!(
        "🔔 *Trade Detected!*\n\n👤 Target: `{}`\n📥 Sold: {} {}\n📤 Bought: {} {}\n\n⚡ Copying trade...",
        short_address(target),
        event.input_amount.normalize(),
        event.input_symbol(),
        event.output_amount.normalize(),
        event.output_symbol(),
    )
}

pub fn format_copy_success(
    amount: Decimal,
    event: &SwapEvent,
    copy_percentage: Decimal,
    signature: &str,
) -> String {
    format!(
        "✅ *Copy Trade Executed!*\n\n📥 Sold: {} {}\n📤 Buying: {}\n📊 Percentage: {}%\n\n🔗 [View Transaction]({})",
        amount.round_dp(6).normalize(),
        event.input_symbol(),
        event.output_symbol(),
        copy_percentage.normalize(),
        solscan_tx_url(signature),
    )
}

pub fn format_copy_failure(error: &str) -> String {
    format!(
        "❌ *Copy Trade Failed!*\n\nError: {}\n\nPlease check your wallet balance and try again.",
        escape_markdown(error)
    )
}

pub fn format_manual_trade_success(action: &str, signature: &str) -> String {
    format!(
        "✅ *{action} submitted!*\n\n🔗 [View Transaction]({})",
        solscan_tx_url(signature)
    )
}

pub fn format_manual_trade_failure(action: &str, error: &str) -> String {
    format!("❌ *{action} failed!*\n\nError: {}", escape_markdown(error))
}
