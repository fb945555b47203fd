//! Prometheus metrics for observability.
//!
//! - HTTP request metrics (latency, counts, in-flight)
//! - Authentication failures
//! - Catalog operation outcomes
//! - Catalog row counts (collected when `/metrics` is scraped)

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;
use tracing::warn;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "podcatalog_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("podcatalog_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "podcatalog_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "podcatalog_auth_failures_total",
            "Total authentication and authorization failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Operation Metrics
// =============================================================================

/// Catalog operation outcomes, `outcome` is `ok` or the failure kind.
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "podcatalog_operations_total",
            "Catalog operations by outcome",
        ),
        &["operation", "outcome"],
    )
    .unwrap()
});

// =============================================================================
// Catalog Metrics (collected dynamically)
// =============================================================================

/// Row counts per entity.
pub static CATALOG_ENTITIES: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("podcatalog_catalog_entities", "Number of stored entities"),
        &["entity"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Operations
    registry
        .register(Box::new(OPERATIONS_TOTAL.clone()))
        .unwrap();

    // Catalog
    registry
        .register(Box::new(CATALOG_ENTITIES.clone()))
        .unwrap();
}

/// Count one catalog operation outcome.
pub fn record_operation(operation: &str, outcome: &str) {
    OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
pub fn collect_dynamic_metrics(state: &AppState) {
    match state.podcasts().stats() {
        Ok(stats) => {
            for (entity, count) in [
                ("podcasts", stats.podcasts),
                ("episodes", stats.episodes),
                ("reviews", stats.reviews),
                ("users", stats.users),
            ] {
                CATALOG_ENTITIES
                    .with_label_values(&[entity])
                    .set(i64::try_from(count).unwrap_or(i64::MAX));
            }
        }
        Err(e) => warn!("Skipping catalog metrics: {}", e),
    }
}

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    // Matches don't overlap, so "/1/2" needs a second pass.
    let once = NUMERIC_SEGMENT.replace_all(path, "/{id}$1");
    NUMERIC_SEGMENT.replace_all(&once, "/{id}$1").into_owned()
}
