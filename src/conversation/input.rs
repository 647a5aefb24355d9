use rust_decimal::Decimal;
use std::str::FromStr;

/// Main-menu selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Buy,
    Sell,
    Copy,
    StopCopying,
    PublicKey,
    PrivateKey,
    Balance,
    Cancel,
}

/// A user action after transport decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    Start,
    Menu(MenuAction),
    BuyAmount(Decimal),
    SellPercentage(Decimal),
    CopyPercentage(Decimal),
    Text(String),
}

pub const CB_BUY: &str = "buy";
pub const CB_SELL: &str = "sell";
pub const CB_COPY: &str = "copy";
pub const CB_STOP_COPY: &str = "stop_copy";
pub const CB_PUBLIC: &str = "public";
pub const CB_PRIVATE: &str = "private";
pub const CB_BALANCE: &str = "balance";
pub const CB_CANCEL: &str = "cancel";
pub const CB_BUY_AMOUNT: &str = "buy_amount:";
pub const CB_SELL_PCT: &str = "sell_pct:";
pub const CB_COPY_PCT: &str = "copy_pct:";

impl UserInput {
    /// Decode inline-button callback data.
    pub fn from_callback(data: &str) -> Option<Self> {
        let menu = match data {
            CB_BUY => Some(MenuAction::Buy),
            CB_SELL => Some(MenuAction::Sell),
            CB_COPY => Some(MenuAction::Copy),
            CB_STOP_COPY => Some(MenuAction::StopCopying),
            CB_PUBLIC => Some(MenuAction::PublicKey),
            CB_PRIVATE => Some(MenuAction::PrivateKey),
            CB_BALANCE => Some(MenuAction::Balance),
            CB_CANCEL => Some(MenuAction::Cancel),
            _ => None,
        };
        if let Some(action) = menu {
            return Some(UserInput::Menu(action));
        }

        if let Some(v) = data.strip_prefix(CB_BUY_AMOUNT) {
            return Decimal::from_str(v).ok().map(UserInput::BuyAmount);
        }
        if let Some(v) = data.strip_prefix(CB_SELL_PCT) {
            return Decimal::from_str(v).ok().map(UserInput::SellPercentage);
        }
        if let Some(v) = data.strip_prefix(CB_COPY_PCT) {
            return Decimal::from_str(v).ok().map(UserInput::CopyPercentage);
        }
        None
    }

    /// Decode a text message; slash commands map to menu actions.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        // "/start@MyBot" in group chats
        let command = trimmed.split('@').next().unwrap_or(trimmed);
        match command {
            "/start" => UserInput::Start,
            "/buy" => UserInput::Menu(MenuAction::Buy),
            "/sell" => UserInput::Menu(MenuAction::Sell),
            "/copy" => UserInput::Menu(MenuAction::Copy),
            "/stop" => UserInput::Menu(MenuAction::StopCopying),
            "/balance" => UserInput::Menu(MenuAction::Balance),
            "/cancel" => UserInput::Menu(MenuAction::Cancel),
            _ => UserInput::Text(trimmed.to_string()),
        }
    }
}
