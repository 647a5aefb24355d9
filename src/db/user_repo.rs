use sqlx::PgPool;

use crate::models::User;

/// Fetch the user owning a chat.
pub async fn get_user_by_chat(pool: &PgPool, chat_id: i64) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE chat_id = $1")
        .bind(chat_id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Insert a user, or return the existing row when the chat is already registered.
pub async fn insert_user(
    pool: &PgPool,
    chat_id: i64,
    public_key: &str,
    private_key: &str,
) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (chat_id, public_key, private_key)
        VALUES ($1, $2, $3)
        ON CONFLICT (chat_id) DO UPDATE SET chat_id = EXCLUDED.chat_id
        RETURNING *
        "#,
    )
    .bind(chat_id)
    .bind(public_key)
    .bind(private_key)
    .fetch_one(pool)
    .await?;

    Ok(user)
}
