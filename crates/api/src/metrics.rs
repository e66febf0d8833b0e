// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics module
//!
//! Provides global metrics using the default Prometheus registry via macros and
//! an Axum-compatible metrics handler.

use std::{sync::LazyLock, time::Duration};

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use external_apis::RaceOutcome;
use prometheus::{
    HistogramVec, IntCounterVec, TextEncoder, register_histogram_vec, register_int_counter_vec,
};
use tracing::error;

/// Total number of lookups, labeled by outcome (`resolved` or `unresolved`).
pub static LOOKUPS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "zip_finder_lookups_total",
        "Total number of postal code lookups, labeled by outcome",
        &["outcome"]
    )
    .expect("Failed to create zip_finder_lookups_total counter vec")
});

/// Races won, labeled by the winning provider.
pub static LOOKUP_WINNERS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "zip_finder_lookup_winners_total",
        "Total number of lookups won, labeled by provider",
        &["provider"]
    )
    .expect("Failed to create zip_finder_lookup_winners_total counter vec")
});

/// Histogram for lookup durations in seconds.
pub static LOOKUP_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "zip_finder_lookup_duration_seconds",
        "Postal code lookup durations in seconds",
        &["outcome"],
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 0.75, 1.0, 1.5]
    )
    .expect("Failed to create lookup duration histogram")
});

/// Record the outcome of one lookup
///
/// # Arguments
/// * `outcome` - How the race ended
/// * `elapsed` - Time from dispatch to answer
pub fn record_lookup(outcome: &RaceOutcome, elapsed: Duration) {
    let label = outcome.label();
    LOOKUPS.with_label_values(&[label]).inc();
    LOOKUP_DURATION
        .with_label_values(&[label])
        .observe(elapsed.as_secs_f64());

    if let RaceOutcome::Resolved(record) = outcome {
        LOOKUP_WINNERS.with_label_values(&[record.provider()]).inc();
    }
}

/// Axum handler that exports metrics in Prometheus text format
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
