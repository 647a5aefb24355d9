use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::conversation::{ChatContext, ConversationService, Keyboard, UserInput};
use crate::errors::BotError;

use super::notifier::ChatNotifier;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const LONG_POLL_SECS: u64 = 30;
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Bot API shapes (only the fields the bot reads)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub data: Option<String>,
    pub message: Option<Message>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Telegram Bot API over HTTPS.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Self {
        Self::with_base_url(TELEGRAM_API_BASE, bot_token)
    }

    pub fn with_base_url(api_base: &str, bot_token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token),
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
    ) -> Result<T, BotError> {
        let url = format!("{}/{method}", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BotError::ExternalService(format!("telegram {method}: {e}")))?;

        let parsed: ApiResponse<T> = resp
            .json()
            .await
            .map_err(|e| BotError::ExternalService(format!("telegram {method}: {e}")))?;

        match (parsed.ok, parsed.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(BotError::ExternalService(format!(
                "telegram {method}: {}",
                parsed.description.unwrap_or_else(|| "request rejected".into())
            ))),
        }
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), BotError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });
        if let Some(kb) = keyboard {
            body["reply_markup"] = inline_keyboard(kb);
        }

        self.call::<Value>("sendMessage", &body).await.map(|_| ())
    }

    pub async fn answer_callback(&self, callback_id: &str) -> Result<(), BotError> {
        let body = json!({ "callback_query_id": callback_id });
        self.call::<Value>("answerCallbackQuery", &body)
            .await
            .map(|_| ())
    }

    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, BotError> {
        let body = json!({
            "offset": offset,
            "timeout": LONG_POLL_SECS,
            "allowed_updates": ["message", "callback_query"],
        });
        self.call("getUpdates", &body).await
    }
}

#[async_trait]
impl ChatNotifier for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.send_message(chat_id, text, None).await {
            tracing::warn!(chat_id, error = %e, "Failed to send Telegram notification");
        }
    }
}

fn inline_keyboard(kb: &Keyboard) -> Value {
    let rows: Vec<Vec<Value>> = kb
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| json!({ "text": b.label, "callback_data": b.data }))
                .collect()
        })
        .collect();
    json!({ "inline_keyboard": rows })
}

// ---------------------------------------------------------------------------
// Per-update chat capability
// ---------------------------------------------------------------------------

pub struct TelegramContext {
    client: TelegramClient,
    chat_id: i64,
    text: Option<String>,
    callback_id: Option<String>,
}

#[async_trait]
impl ChatContext for TelegramContext {
    fn chat_id(&self) -> i64 {
        self.chat_id
    }

    fn raw_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    async fn send_text(&self, text: &str, keyboard: Option<&Keyboard>) -> Result<(), BotError> {
        self.client.send_message(self.chat_id, text, keyboard).await
    }

    async fn acknowledge_callback(&self) -> Result<(), BotError> {
        match &self.callback_id {
            Some(id) => self.client.answer_callback(id).await,
            None => Ok(()),
        }
    }
}

/// Turn an update into a chat capability plus decoded input. Updates the bot
/// does not act on yield `None`.
pub fn decode_update(client: &TelegramClient, update: Update) -> Option<(TelegramContext, UserInput)> {
    if let Some(query) = update.callback_query {
        let chat_id = query.message.as_ref()?.chat.id;
        let input = UserInput::from_callback(query.data.as_deref()?)?;
        let ctx = TelegramContext {
            client: client.clone(),
            chat_id,
            text: None,
            callback_id: Some(query.id),
        };
        return Some((ctx, input));
    }

    let message = update.message?;
    let text = message.text?;
    let input = UserInput::from_text(&text);
    let ctx = TelegramContext {
        client: client.clone(),
        chat_id: message.chat.id,
        text: Some(text),
        callback_id: None,
    };
    Some((ctx, input))
}

/// Long-poll updates forever, handling each on its own task.
pub async fn run_telegram_bot(client: TelegramClient, service: Arc<ConversationService>) {
    tracing::info!("Telegram bot polling started");
    let mut offset = 0i64;

    loop {
        let updates = match client.get_updates(offset).await {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed");
                tokio::time::sleep(POLL_ERROR_PAUSE).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some((ctx, input)) = decode_update(&client, update) else {
                continue;
            };
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service.handle(&ctx, input).await;
            });
        }
    }
}
