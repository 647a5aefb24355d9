pub mod settings_repo;
pub mod target_repo;
pub mod user_repo;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::BotError;
use crate::models::{CopySettings, Follower, FollowerCopyConfig, TargetWallet, User};

pub async fn init_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    // Verify connectivity
    sqlx::query("SELECT 1").execute(&pool).await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Persistence contract used by the copy-trade core and the dialogs.
#[async_trait]
pub trait CopyStore: Send + Sync {
    async fn find_user_by_chat(&self, chat_id: i64) -> Result<Option<User>, BotError>;

    async fn create_user(
        &self,
        chat_id: i64,
        public_key: &str,
        private_key: &str,
    ) -> Result<User, BotError>;

    async fn upsert_target(&self, user_id: Uuid, address: &str) -> Result<TargetWallet, BotError>;

    async fn active_targets_for_user(&self, user_id: Uuid) -> Result<Vec<TargetWallet>, BotError>;

    async fn deactivate_target(&self, user_id: Uuid, address: &str) -> Result<(), BotError>;

    async fn upsert_copy_settings(
        &self,
        user_id: Uuid,
        copy_percentage: Decimal,
        max_trade_amount: Decimal,
    ) -> Result<CopySettings, BotError>;

    async fn disable_copy_settings(&self, user_id: Uuid) -> Result<(), BotError>;

    /// All active configs, across every target.
    async fn active_copy_configs(&self) -> Result<Vec<FollowerCopyConfig>, BotError>;

    /// Followers currently copying `address`, with their user records.
    async fn active_followers(&self, address: &str) -> Result<Vec<Follower>, BotError>;
}

/// Postgres-backed `CopyStore`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn db_err(e: anyhow::Error) -> BotError {
    BotError::Database(e.to_string())
}

#[async_trait]
impl CopyStore for PgStore {
    async fn find_user_by_chat(&self, chat_id: i64) -> Result<Option<User>, BotError> {
        user_repo::get_user_by_chat(&self.pool, chat_id)
            .await
            .map_err(db_err)
    }

    async fn create_user(
        &self,
        chat_id: i64,
        public_key: &str,
        private_key: &str,
    ) -> Result<User, BotError> {
        user_repo::insert_user(&self.pool, chat_id, public_key, private_key)
            .await
            .map_err(db_err)
    }

    async fn upsert_target(&self, user_id: Uuid, address: &str) -> Result<TargetWallet, BotError> {
        target_repo::upsert_target(&self.pool, user_id, address)
            .await
            .map_err(db_err)
    }

    async fn active_targets_for_user(&self, user_id: Uuid) -> Result<Vec<TargetWallet>, BotError> {
        target_repo::get_active_targets_for_user(&self.pool, user_id)
            .await
            .map_err(db_err)
    }

    async fn deactivate_target(&self, user_id: Uuid, address: &str) -> Result<(), BotError> {
        target_repo::deactivate_target(&self.pool, user_id, address)
            .await
            .map_err(db_err)
    }

    async fn upsert_copy_settings(
        &self,
        user_id: Uuid,
        copy_percentage: Decimal,
        max_trade_amount: Decimal,
    ) -> Result<CopySettings, BotError> {
        settings_repo::upsert_copy_settings(&self.pool, user_id, copy_percentage, max_trade_amount)
            .await
            .map_err(db_err)
    }

    async fn disable_copy_settings(&self, user_id: Uuid) -> Result<(), BotError> {
        settings_repo::disable_copy_settings(&self.pool, user_id)
            .await
            .map_err(db_err)
    }

    async fn active_copy_configs(&self) -> Result<Vec<FollowerCopyConfig>, BotError> {
        settings_repo::get_active_copy_configs(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn active_followers(&self, address: &str) -> Result<Vec<Follower>, BotError> {
        let configs = settings_repo::get_configs_for_target(&self.pool, address)
            .await
            .map_err(db_err)?;
        if configs.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = configs.iter().map(|c| c.follower_id).collect();
        let mut users: HashMap<Uuid, User> = settings_repo::get_users_by_ids(&self.pool, &ids)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(configs
            .into_iter()
            .filter_map(|config| {
                users
                    .remove(&config.follower_id)
                    .map(|user| Follower { user, config })
            })
            .collect())
    }
}
