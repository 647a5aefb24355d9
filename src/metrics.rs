use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// The returned handle renders the text/plain scrape payload.
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {e}"))?;

    register_metrics();
    Ok(handle)
}

/// Pre-register so every series shows up before its first event.
pub fn register_metrics() {
    counter!("chain_notifications_total").absolute(0);
    counter!("swaps_detected_total").absolute(0);
    counter!("copy_trades_executed").absolute(0);
    counter!("copy_trades_failed").absolute(0);
    counter!("manual_trades_total", "action" => "buy").absolute(0);
    counter!("manual_trades_total", "action" => "sell").absolute(0);

    gauge!("watched_targets").set(0.0);
}
