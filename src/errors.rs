use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Errors raised inside the copy-trade core and the chat dialogs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BotError {
    /// Malformed address, token, amount or percentage.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No user record, no held token, no active config.
    #[error("not found: {0}")]
    NotFound(String),

    /// RPC or swap-router call failed or returned an unexpected shape.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// Corrupt key material or undecodable transaction.
    #[error("signing error: {0}")]
    Signing(String),

    #[error("database error: {0}")]
    Database(String),
}

impl BotError {
    /// The single line shown to a chat user.
    pub fn user_message(&self) -> String {
        match self {
            BotError::Validation(msg) => format!("❌ {msg}"),
            BotError::NotFound(msg) => format!("❌ {msg}"),
            BotError::ExternalService(msg) => format!("❌ Service error: {msg}"),
            BotError::Signing(msg) => format!("❌ Could not sign transaction: {msg}"),
            BotError::Database(_) => "❌ Internal storage error, please try again later".into(),
        }
    }
}

impl From<sqlx::Error> for BotError {
    fn from(e: sqlx::Error) -> Self {
        BotError::Database(e.to_string())
    }
}

/// Errors surfaced by the operational HTTP API.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}
