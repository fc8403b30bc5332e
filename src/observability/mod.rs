// Observability: metrics for the enrichment pipeline

pub mod metrics;

pub use metrics::{init_metrics, EnrichMetrics};
