pub mod notifier;
pub mod telegram;

pub use notifier::{ChatNotifier, LogNotifier};
pub use telegram::{run_telegram_bot, TelegramClient};
