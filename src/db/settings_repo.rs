use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CopySettings, FollowerCopyConfig, User};

/// Shared projection for the follower joins below.
const FOLLOWER_CONFIG_SELECT: &str = r#"
    SELECT t.user_id          AS follower_id,
           t.address          AS target_address,
           s.copy_percentage  AS copy_percentage,
           s.max_trade_amount AS max_trade_amount,
           (t.is_active AND s.is_active) AS active
    FROM target_wallets t
    JOIN copy_settings s ON s.user_id = t.user_id
    WHERE t.is_active = true AND s.is_active = true
"#;

pub async fn upsert_copy_settings(
    pool: &PgPool,
    user_id: Uuid,
    copy_percentage: Decimal,
    max_trade_amount: Decimal,
) -> anyhow::Result<CopySettings> {
    let settings = sqlx::query_as::<_, CopySettings>(
        r#"
        INSERT INTO copy_settings (user_id, copy_percentage, max_trade_amount, is_active)
        VALUES ($1, $2, $3, true)
        ON CONFLICT (user_id) DO UPDATE
            SET copy_percentage = $2,
                max_trade_amount = $3,
                is_active = true,
                updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(copy_percentage)
    .bind(max_trade_amount)
    .fetch_one(pool)
    .await?;

    Ok(settings)
}

pub async fn disable_copy_settings(pool: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("UPDATE copy_settings SET is_active = false, updated_at = NOW() WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Every active (follower, target) pair, used to rebuild monitors at startup.
pub async fn get_active_copy_configs(pool: &PgPool) -> anyhow::Result<Vec<FollowerCopyConfig>> {
    let configs = sqlx::query_as::<_, FollowerCopyConfig>(FOLLOWER_CONFIG_SELECT)
        .fetch_all(pool)
        .await?;

    Ok(configs)
}

/// Active configs for one target address.
pub async fn get_configs_for_target(
    pool: &PgPool,
    address: &str,
) -> anyhow::Result<Vec<FollowerCopyConfig>> {
    let query = format!("{FOLLOWER_CONFIG_SELECT} AND t.address = $1");
    let configs = sqlx::query_as::<_, FollowerCopyConfig>(&query)
        .bind(address)
        .fetch_all(pool)
        .await?;

    Ok(configs)
}

pub async fn get_users_by_ids(pool: &PgPool, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;

    Ok(users)
}
