use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use metrics::gauge;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::db::CopyStore;
use crate::errors::BotError;
use crate::solana::SignatureFeed;

use super::listener::TransactionListener;

/// Opaque handle to one live address subscription.
pub struct SubscriptionHandle {
    id: u64,
    active: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    /// Stop turning future notifications into copy trades. Work already
    /// dispatched keeps running.
    fn cancel(self) {
        self.active.store(false, Ordering::Release);
        self.task.abort();
    }
}

struct TargetWatch {
    handle: SubscriptionHandle,
    followers: HashSet<Uuid>,
}

type WatchMap = Mutex<HashMap<String, TargetWatch>>;

/// One streaming subscription per watched target address. Memory-only; use
/// [`SubscriptionRegistry::start_all_monitors`] to rebuild after a restart.
pub struct SubscriptionRegistry {
    feed: Arc<dyn SignatureFeed>,
    listener: Arc<TransactionListener>,
    watches: Arc<WatchMap>,
    address_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    next_id: AtomicU64,
}

impl SubscriptionRegistry {
    pub fn new(feed: Arc<dyn SignatureFeed>, listener: Arc<TransactionListener>) -> Self {
        Self {
            feed,
            listener,
            watches: Arc::new(Mutex::new(HashMap::new())),
            address_locks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Watch `address` on behalf of `follower`. Opens a subscription only if
    /// none exists yet; returns whether a new one was opened. Open failures
    /// are returned to the caller and not retried.
    ///
    /// Only operations on the same address wait for a pending open.
    pub async fn start_monitoring(&self, address: &str, follower: Uuid) -> Result<bool, BotError> {
        let lock = self.address_lock(address).await;
        let result = {
            let _opening = lock.lock().await;
            self.open_locked(address, follower).await
        };
        self.forget_address_lock(address, lock).await;
        result
    }

    async fn open_locked(&self, address: &str, follower: Uuid) -> Result<bool, BotError> {
        if let Some(watch) = self.watches.lock().await.get_mut(address) {
            watch.followers.insert(follower);
            tracing::debug!(address = %address, "Already monitoring");
            return Ok(false);
        }

        let rx = self.feed.subscribe(address).await?;
        let handle = self.spawn_dispatcher(address.to_string(), rx);
        let id = handle.id;

        let mut watches = self.watches.lock().await;
        watches.insert(
            address.to_string(),
            TargetWatch {
                handle,
                followers: HashSet::from([follower]),
            },
        );
        gauge!("watched_targets").set(watches.len() as f64);

        tracing::info!(address = %address, subscription = id, "Started monitoring");
        Ok(true)
    }

    /// Cancel the subscription for `address`. No-op when not watched.
    pub async fn stop_monitoring(&self, address: &str) -> bool {
        let lock = self.address_lock(address).await;
        let stopped = {
            let _opening = lock.lock().await;
            self.stop_locked(address).await
        };
        self.forget_address_lock(address, lock).await;
        stopped
    }

    async fn stop_locked(&self, address: &str) -> bool {
        let removed = {
            let mut watches = self.watches.lock().await;
            let removed = watches.remove(address);
            gauge!("watched_targets").set(watches.len() as f64);
            removed
        };

        match removed {
            Some(watch) => {
                watch.handle.cancel();
                tracing::info!(address = %address, "Stopped monitoring");
                true
            }
            None => false,
        }
    }

    /// Drop `follower` from `address`, stopping the subscription once nobody
    /// is left. Returns whether the subscription was stopped.
    pub async fn release_follower(&self, address: &str, follower: Uuid) -> bool {
        let lock = self.address_lock(address).await;
        let stopped = {
            let _opening = lock.lock().await;
            let empty = match self.watches.lock().await.get_mut(address) {
                Some(watch) => {
                    watch.followers.remove(&follower);
                    Some(watch.followers.is_empty())
                }
                None => None,
            };
            match empty {
                Some(true) => self.stop_locked(address).await,
                Some(false) => {
                    tracing::debug!(address = %address, "Other followers remain, keeping subscription");
                    false
                }
                None => false,
            }
        };
        self.forget_address_lock(address, lock).await;
        stopped
    }

    async fn address_lock(&self, address: &str) -> Arc<Mutex<()>> {
        let mut locks = self.address_locks.lock().await;
        Arc::clone(locks.entry(address.to_string()).or_default())
    }

    /// Drop the per-address lock once no other caller holds a clone.
    async fn forget_address_lock(&self, address: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.address_locks.lock().await;
        // map entry + ours
        if Arc::strong_count(&lock) == 2 {
            locks.remove(address);
        }
    }

    /// Load every active (follower, target) pair and watch each target.
    /// Per-address failures are logged and skipped.
    pub async fn start_all_monitors(&self, store: &dyn CopyStore) -> Result<usize, BotError> {
        let configs = store.active_copy_configs().await?;
        tracing::info!(configs = configs.len(), "Starting monitors...");

        for config in &configs {
            if let Err(e) = self
                .start_monitoring(&config.target_address, config.follower_id)
                .await
            {
                tracing::error!(
                    address = %config.target_address,
                    error = %e,
                    "Failed to start monitor"
                );
            }
        }

        let count = self.watched_count().await;
        tracing::info!(watched = count, "All monitors started");
        Ok(count)
    }

    pub async fn is_watching(&self, address: &str) -> bool {
        self.watches.lock().await.contains_key(address)
    }

    pub async fn watched_count(&self) -> usize {
        self.watches.lock().await.len()
    }

    /// `(address, follower_count)` for every live subscription.
    pub async fn watched_targets(&self) -> Vec<(String, usize)> {
        let watches = self.watches.lock().await;
        let mut targets: Vec<(String, usize)> = watches
            .iter()
            .map(|(address, w)| (address.clone(), w.followers.len()))
            .collect();
        targets.sort();
        targets
    }

    /// Cancel every subscription.
    pub async fn shutdown(&self) {
        let drained: Vec<(String, TargetWatch)> = self.watches.lock().await.drain().collect();
        gauge!("watched_targets").set(0.0);
        for (address, watch) in drained {
            watch.handle.cancel();
            tracing::info!(address = %address, "Stopped monitoring (shutdown)");
        }
    }

    /// Forward each signature to the listener on its own task, so slow or
    /// failing events never hold up the stream.
    fn spawn_dispatcher(&self, address: String, mut rx: mpsc::Receiver<String>) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        let listener = Arc::clone(&self.listener);
        let watches: Weak<WatchMap> = Arc::downgrade(&self.watches);
        let task_active = Arc::clone(&active);

        let task = tokio::spawn(async move {
            while let Some(signature) = rx.recv().await {
                if !task_active.load(Ordering::Acquire) {
                    return;
                }
                let listener = Arc::clone(&listener);
                let address = address.clone();
                tokio::spawn(async move {
                    listener.handle_notification(&address, &signature).await;
                });
            }

            if !task_active.load(Ordering::Acquire) {
                return;
            }

            // Feed closed on its own: forget the entry so a later start can reopen it
            tracing::warn!(address = %address, "Subscription feed closed");
            if let Some(watches) = watches.upgrade() {
                let mut watches = watches.lock().await;
                if watches.get(&address).map(|w| w.handle.id) == Some(id) {
                    watches.remove(&address);
                    gauge!("watched_targets").set(watches.len() as f64);
                }
            }
        });

        SubscriptionHandle { id, active, task }
    }
}
