//! Enrichment metrics
//!
//! Counters follow the naming convention `enricher_{name}_total`. A Prometheus
//! recorder is only installed when `PROMETHEUS_ADDR` is set; without a recorder
//! the `metrics` macros are no-ops.

use std::sync::Once;
use tracing::{info, warn};

static INIT: Once = Once::new();

macro_rules! enrich_metric {
    (counter, $name:literal) => {
        concat!("enricher_", $name, "_total")
    };
}

/// Install the Prometheus recorder with an HTTP listener. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| {
        let addr_str = match std::env::var("PROMETHEUS_ADDR") {
            Ok(v) if !v.trim().is_empty() => v,
            _ => {
                info!("metrics: PROMETHEUS_ADDR not set, exporter disabled");
                return;
            }
        };

        let addr = match addr_str.parse::<std::net::SocketAddr>() {
            Ok(addr) => addr,
            Err(e) => {
                warn!("Invalid metrics addr '{}': {}", addr_str, e);
                return;
            }
        };

        match metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
        {
            Ok(()) => {
                info!("Prometheus HTTP exporter started at http://{}/metrics", addr);
                EnrichMetrics::register_metrics();
            }
            Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
        }
    });
}

/// Counters for each pipeline outcome.
pub struct EnrichMetrics;

impl EnrichMetrics {
    pub fn invocation() {
        ::metrics::counter!(enrich_metric!(counter, "invocations")).increment(1);
    }

    pub fn skipped_missing_artist() {
        ::metrics::counter!(enrich_metric!(counter, "skipped_missing_artist")).increment(1);
    }

    pub fn credential_failure() {
        ::metrics::counter!(enrich_metric!(counter, "credential_failures")).increment(1);
    }

    pub fn search_failure() {
        ::metrics::counter!(enrich_metric!(counter, "search_failures")).increment(1);
    }

    pub fn no_cover() {
        ::metrics::counter!(enrich_metric!(counter, "no_cover")).increment(1);
    }

    pub fn cover_written() {
        ::metrics::counter!(enrich_metric!(counter, "covers_written")).increment(1);
    }

    pub fn write_failure() {
        ::metrics::counter!(enrich_metric!(counter, "write_failures")).increment(1);
    }

    /// Pre-register so every series shows up on `/metrics` before first use.
    pub fn register_metrics() {
        for name in Self::metric_names() {
            let _ = ::metrics::counter!(name);
        }
    }

    pub fn metric_names() -> [&'static str; 7] {
        [
            enrich_metric!(counter, "invocations"),
            enrich_metric!(counter, "skipped_missing_artist"),
            enrich_metric!(counter, "credential_failures"),
            enrich_metric!(counter, "search_failures"),
            enrich_metric!(counter, "no_cover"),
            enrich_metric!(counter, "covers_written"),
            enrich_metric!(counter, "write_failures"),
        ]
    }
}
