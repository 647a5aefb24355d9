use async_trait::async_trait;

use crate::errors::BotError;

/// An inline button: label shown to the user, data sent back on press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Transport-neutral inline keyboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        self.rows.push(buttons);
        self
    }
}

/// What a dialog step may do with the chat that triggered it.
#[async_trait]
pub trait ChatContext: Send + Sync {
    fn chat_id(&self) -> i64;

    /// Text of the triggering message, if it was a text message.
    fn raw_text(&self) -> Option<&str>;

    async fn send_text(&self, text: &str, keyboard: Option<&Keyboard>) -> Result<(), BotError>;

    /// Clear the loading state of a pressed button. No-op for plain messages.
    async fn acknowledge_callback(&self) -> Result<(), BotError>;
}
