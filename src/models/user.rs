use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Bot user with their custodial wallet.
#[derive(Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub chat_id: i64,
    pub public_key: String,
    /// Base64 of the 64-byte ed25519 keypair.
    pub private_key: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("chat_id", &self.chat_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TargetWallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CopySettings {
    pub user_id: Uuid,
    pub copy_percentage: Decimal,
    pub max_trade_amount: Decimal,
    pub is_active: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Effective copy configuration for one (follower, target) pair.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct FollowerCopyConfig {
    pub follower_id: Uuid,
    pub target_address: String,
    pub copy_percentage: Decimal,
    pub max_trade_amount: Decimal,
    pub active: bool,
}

/// A follower resolved for execution: who they are plus how much to copy.
#[derive(Debug, Clone)]
pub struct Follower {
    pub user: User,
    pub config: FollowerCopyConfig,
}
