use sqlx::PgPool;
use uuid::Uuid;

use crate::models::TargetWallet;

/// Start (or resume) following `address` for a user.
pub async fn upsert_target(
    pool: &PgPool,
    user_id: Uuid,
    address: &str,
) -> anyhow::Result<TargetWallet> {
    let target = sqlx::query_as::<_, TargetWallet>(
        r#"
        INSERT INTO target_wallets (user_id, address)
        VALUES ($1, $2)
        ON CONFLICT (user_id, address) DO UPDATE
            SET is_active = true, updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(address)
    .fetch_one(pool)
    .await?;

    Ok(target)
}

pub async fn get_active_targets_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<Vec<TargetWallet>> {
    let targets = sqlx::query_as::<_, TargetWallet>(
        "SELECT * FROM target_wallets WHERE user_id = $1 AND is_active = true ORDER BY created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(targets)
}

/// Soft-disable one followed address.
pub async fn deactivate_target(pool: &PgPool, user_id: Uuid, address: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE target_wallets
        SET is_active = false, updated_at = NOW()
        WHERE user_id = $1 AND address = $2
        "#,
    )
    .bind(user_id)
    .bind(address)
    .execute(pool)
    .await?;

    Ok(())
}
