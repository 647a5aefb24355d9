mod common;

use rust_decimal::Decimal;

use copybot::db::{settings_repo, target_repo, user_repo, CopyStore, PgStore};

#[tokio::test]
async fn test_user_insert_is_idempotent_per_chat() {
    let Some(pool) = common::setup_test_db().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };

    let chat = common::fresh_chat_id();
    let first = user_repo::insert_user(&pool, chat, "pubA", "privA").await.unwrap();
    let again = user_repo::insert_user(&pool, chat, "pubB", "privB").await.unwrap();

    assert_eq!(first.id, again.id);
    assert_eq!(again.public_key, "pubA");
    let found = user_repo::get_user_by_chat(&pool, chat).await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
}

#[tokio::test]
async fn test_follower_configs_join_targets_and_settings() {
    let Some(pool) = common::setup_test_db().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let store = PgStore::new(pool.clone());
    let target = common::wallet_address();

    let chat = common::fresh_chat_id();
    let user = store.create_user(chat, "pub7", "priv7").await.unwrap();
    store.upsert_target(user.id, &target).await.unwrap();

    // No settings yet: nothing to copy
    assert!(store.active_followers(&target).await.unwrap().is_empty());

    store
        .upsert_copy_settings(user.id, Decimal::from(40), Decimal::new(25, 1))
        .await
        .unwrap();

    let followers = store.active_followers(&target).await.unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].user.chat_id, chat);
    assert_eq!(followers[0].config.copy_percentage, Decimal::from(40));
    assert_eq!(followers[0].config.max_trade_amount, Decimal::new(25, 1));

    let configs = settings_repo::get_configs_for_target(&pool, &target).await.unwrap();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].follower_id, user.id);
}

#[tokio::test]
async fn test_deactivated_target_drops_out() {
    let Some(pool) = common::setup_test_db().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let store = PgStore::new(pool.clone());
    let target = common::wallet_address();

    let user = store.create_user(common::fresh_chat_id(), "pub8", "priv8").await.unwrap();
    store.upsert_target(user.id, &target).await.unwrap();
    store
        .upsert_copy_settings(user.id, Decimal::from(10), Decimal::ONE)
        .await
        .unwrap();

    target_repo::deactivate_target(&pool, user.id, &target).await.unwrap();

    assert!(store.active_targets_for_user(user.id).await.unwrap().is_empty());
    assert!(store.active_followers(&target).await.unwrap().is_empty());

    // Re-following reactivates the same row
    let again = store.upsert_target(user.id, &target).await.unwrap();
    assert!(again.is_active);
    assert_eq!(store.active_followers(&target).await.unwrap().len(), 1);
}
