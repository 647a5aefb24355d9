pub mod api;
pub mod config;
pub mod conversation;
pub mod db;
pub mod errors;
pub mod execution;
pub mod ingestion;
pub mod metrics;
pub mod models;
pub mod services;
pub mod solana;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::CopyStore;
use crate::ingestion::SubscriptionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    pub store: Arc<dyn CopyStore>,
    pub registry: Arc<SubscriptionRegistry>,
}
