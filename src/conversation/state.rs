use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::models::TradeAction;

/// Where a chat stands in a multi-step dialog. Scratch data lives inside the
/// variant that needs it, so returning to `Idle` discards it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingToken {
        action: TradeAction,
    },
    AwaitingAmount {
        token_mint: String,
    },
    AwaitingPercentage {
        token_mint: String,
        token_amount: Decimal,
        token_decimals: u8,
    },
    AwaitingWallet,
    AwaitingCopyPercentage {
        target_wallet: String,
    },
}

impl ConversationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ConversationState::Idle)
    }
}

/// Per-chat dialog state. Entries are isolated per chat id; a chat with no
/// entry is `Idle`.
#[derive(Debug, Default)]
pub struct ConversationStates {
    states: DashMap<i64, ConversationState>,
}

impl ConversationStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chat_id: i64) -> ConversationState {
        self.states
            .get(&chat_id)
            .map(|s| s.value().clone())
            .unwrap_or_default()
    }

    /// Replace the chat's state; `Idle` removes the entry.
    pub fn set(&self, chat_id: i64, state: ConversationState) {
        if state.is_idle() {
            self.states.remove(&chat_id);
        } else {
            self.states.insert(chat_id, state);
        }
    }

    pub fn reset(&self, chat_id: i64) {
        self.states.remove(&chat_id);
    }

    /// Chats currently mid-dialog.
    pub fn active_count(&self) -> usize {
        self.states.len()
    }
}
