//! Prometheus metrics for the HTTP surface and the analytics build.
//!
//! Recording through the `metrics` macros is a no-op until [`init_metrics`]
//! installs the exporter, so handlers and tests never need to care whether
//! metrics are enabled.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{info, warn};

pub const HTTP_REQUESTS_TOTAL: &str = "justoo_http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "justoo_http_request_duration_seconds";
pub const ANALYTICS_BUILD_DURATION_SECONDS: &str = "justoo_analytics_build_duration_seconds";
pub const ANALYTICS_FAILURES_TOTAL: &str = "justoo_analytics_failures_total";

pub fn init_metrics(port: u16) {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            info!("Prometheus exporter listening on http://{}/metrics", addr);
        }
        Err(e) => {
            warn!("Prometheus exporter install failed (possibly already installed): {}", e);
        }
    }
}

/// Records the elapsed time into `histogram_name` when dropped.
pub struct TimingGuard {
    start: Instant,
    histogram_name: &'static str,
}

impl TimingGuard {
    pub fn new(histogram_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            histogram_name,
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        ::metrics::histogram!(self.histogram_name).record(duration);
    }
}

pub fn time_operation(histogram_name: &'static str) -> TimingGuard {
    TimingGuard::new(histogram_name)
}

/// Per-route request counter and latency histogram. Installed with
/// `route_layer` so the matched route template is available.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = req.method().to_string();

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    ::metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);
    ::metrics::histogram!(
        HTTP_REQUEST_DURATION_SECONDS,
        "method" => method,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_guard_records_without_recorder() {
        let _guard = time_operation("test_metric");
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
}
