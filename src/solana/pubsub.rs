use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use solana_client::nonblocking::pubsub_client::PubsubClient;
use solana_client::rpc_config::{RpcTransactionLogsConfig, RpcTransactionLogsFilter};
use solana_sdk::commitment_config::CommitmentConfig;
use tokio::sync::{mpsc, oneshot};

use crate::errors::BotError;

/// Buffered signatures per watched address before the feed applies backpressure.
const SIGNATURE_BUFFER: usize = 256;

/// A source of transaction signatures that mention an address.
#[async_trait]
pub trait SignatureFeed: Send + Sync {
    /// Open a subscription at "confirmed" commitment. The subscription lives
    /// until the returned receiver is dropped.
    async fn subscribe(&self, address: &str) -> Result<mpsc::Receiver<String>, BotError>;
}

/// `SignatureFeed` over the Solana websocket `logsSubscribe` method.
pub struct PubsubFeed {
    ws_url: String,
    open_timeout: Duration,
}

impl PubsubFeed {
    /// `open_timeout` bounds the connect plus `logsSubscribe` handshake.
    pub fn new(ws_url: String, open_timeout: Duration) -> Self {
        Self {
            ws_url,
            open_timeout,
        }
    }
}

#[async_trait]
impl SignatureFeed for PubsubFeed {
    async fn subscribe(&self, address: &str) -> Result<mpsc::Receiver<String>, BotError> {
        let (tx, rx) = mpsc::channel::<String>(SIGNATURE_BUFFER);
        let (ready_tx, ready_rx) = oneshot::channel::<Result<(), BotError>>();
        let ws_url = self.ws_url.clone();
        let address = address.to_string();

        let task = tokio::spawn(async move {
            let client = match PubsubClient::new(&ws_url).await {
                Ok(c) => c,
                Err(e) => {
                    let _ = ready_tx.send(Err(BotError::ExternalService(format!(
                        "pubsub connect failed: {e}"
                    ))));
                    return;
                }
            };

            let subscription = client
                .logs_subscribe(
                    RpcTransactionLogsFilter::Mentions(vec![address.clone()]),
                    RpcTransactionLogsConfig {
                        commitment: Some(CommitmentConfig::confirmed()),
                    },
                )
                .await;

            let (mut stream, unsubscribe) = match subscription {
                Ok(s) => s,
                Err(e) => {
                    let _ = ready_tx.send(Err(BotError::ExternalService(format!(
                        "logsSubscribe failed: {e}"
                    ))));
                    return;
                }
            };

            if ready_tx.send(Ok(())).is_err() {
                unsubscribe().await;
                return;
            }

            loop {
                tokio::select! {
                    item = stream.next() => {
                        match item {
                            Some(response) => {
                                if tx.send(response.value.signature).await.is_err() {
                                    break;
                                }
                            }
                            None => {
                                tracing::warn!(address = %address, "Log subscription stream ended");
                                break;
                            }
                        }
                    }
                    _ = tx.closed() => break,
                }
            }

            unsubscribe().await;
            tracing::debug!(address = %address, "Log subscription closed");
        });

        match tokio::time::timeout(self.open_timeout, ready_rx).await {
            Ok(Ok(Ok(()))) => Ok(rx),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(_)) => Err(BotError::ExternalService(
                "subscription task exited before confirming".into(),
            )),
            Err(_) => {
                task.abort();
                Err(BotError::ExternalService(format!(
                    "subscription open timed out after {}s",
                    self.open_timeout.as_secs()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_times_out_on_silent_server() {
        // Accepts TCP but never answers the websocket handshake
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let feed = PubsubFeed::new(format!("ws://{addr}"), Duration::from_millis(200));
        let started = std::time::Instant::now();
        let result = feed.subscribe("11111111111111111111111111111111").await;

        assert!(matches!(result, Err(BotError::ExternalService(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
