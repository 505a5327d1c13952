//! Prometheus metrics for agent observability.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder. The handle renders the `/metrics` body.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    }
}

/// Record a JSON-RPC request by method.
pub fn rpc_request(method: &str) {
    counter!("chess_rpc_requests_total", "method" => method.to_string()).increment(1);
}

/// Record a move played by `side` ("user" or "engine").
pub fn move_played(side: &'static str) {
    counter!("chess_moves_total", "side" => side).increment(1);
}

/// Record a fallback to the first legal move.
pub fn engine_fallback(reason: &'static str) {
    counter!("chess_engine_fallbacks_total", "reason" => reason).increment(1);
}

/// Record engine think duration.
pub fn engine_duration(duration_ms: u64) {
    histogram!("chess_engine_duration_ms").record(duration_ms as f64);
}

/// Record a game reaching a terminal position.
pub fn game_finished() {
    counter!("chess_games_finished_total").increment(1);
}

/// Set current live session count.
pub fn active_sessions(count: usize) {
    gauge!("chess_active_sessions").set(count as f64);
}

/// Record an error occurrence.
pub fn error_recorded(kind: &'static str) {
    counter!("chess_errors_total", "kind" => kind).increment(1);
}
