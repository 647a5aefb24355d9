use std::sync::Arc;

use copybot::api::router::create_router;
use copybot::config::AppConfig;
use copybot::conversation::{ConversationService, DialogSettings};
use copybot::db::{self, CopyStore, PgStore};
use copybot::execution::{CopyTradeExecutor, SwapExecutor};
use copybot::ingestion::{SubscriptionRegistry, TransactionListener};
use copybot::services::{run_telegram_bot, ChatNotifier, LogNotifier, TelegramClient};
use copybot::solana::{JupiterClient, PubsubFeed, SolanaRpc};
use copybot::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let metrics_handle = copybot::metrics::init_metrics()?;

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    tracing::info!("Database connected");

    let store: Arc<dyn CopyStore> = Arc::new(PgStore::new(pool.clone()));

    // --- Chain + swap router ---
    let chain = Arc::new(SolanaRpc::new(config.solana_rpc_url.clone()));
    let feed = Arc::new(PubsubFeed::new(
        config.solana_ws_url.clone(),
        config.external_call_timeout(),
    ));
    let router = Arc::new(JupiterClient::new(
        config.swap_api_url.clone(),
        config.swap_slippage_bps,
    ));
    let swaps = Arc::new(SwapExecutor::new(
        router,
        chain.clone(),
        config.external_call_timeout(),
    ));

    // --- Chat transport ---
    let telegram = config.telegram_bot_token.as_deref().map(TelegramClient::new);
    let notifier: Arc<dyn ChatNotifier> = match &telegram {
        Some(client) => Arc::new(client.clone()),
        None => {
            tracing::warn!("No TELEGRAM_BOT_TOKEN, notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    // --- Copy-trade core ---
    let executor = Arc::new(CopyTradeExecutor::new(swaps.clone(), notifier));
    let listener = Arc::new(TransactionListener::new(
        chain,
        store.clone(),
        executor,
        config.swap_program_id.clone(),
    ));
    let registry = Arc::new(SubscriptionRegistry::new(feed, listener));

    if config.copy_enabled {
        let watched = registry.start_all_monitors(store.as_ref()).await?;
        tracing::info!(watched, "Copy trading enabled");
    } else {
        tracing::info!("Copy trading disabled (COPY_ENABLED=false)");
    }

    let bot_task = telegram.map(|client| {
        let service = Arc::new(ConversationService::new(
            store.clone(),
            swaps,
            registry.clone(),
            DialogSettings::from_config(&config),
        ));
        tokio::spawn(run_telegram_bot(client, service))
    });

    let state = AppState {
        db: pool,
        config,
        metrics_handle,
        store,
        registry: registry.clone(),
    };
    let app = create_router(state);

    let tcp = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(tcp, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down...");
    if let Some(task) = bot_task {
        task.abort();
    }
    registry.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl_c");
        std::future::pending::<()>().await;
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}
