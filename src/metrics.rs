use axum::{
    extract::{MatchedPath, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use opentelemetry::{
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};
use std::time::{Duration, Instant};

use crate::handlers::tasks::AppState;

/// Request-level instrument handles
///
/// Built once from a meter at startup and shared by the middleware. The
/// periodic reader exports aggregated values independently of request
/// handling.
#[derive(Clone)]
pub struct RequestMetrics {
    requests: Counter<u64>,
    duration: Histogram<f64>,
}

impl RequestMetrics {
    pub fn new(meter: &Meter) -> Self {
        let requests = meter
            .u64_counter("http.server.requests")
            .with_description("Total number of HTTP requests handled")
            .build();
        let duration = meter
            .f64_histogram("http.server.duration")
            .with_description("HTTP request duration in seconds")
            .with_unit("s")
            .build();

        Self { requests, duration }
    }

    pub fn record(&self, method: &Method, route: &str, status: StatusCode, elapsed: Duration) {
        let attributes = [
            KeyValue::new("http.request.method", method.to_string()),
            KeyValue::new("http.route", route.to_string()),
            KeyValue::new("http.response.status_code", status.as_u16() as i64),
        ];
        self.requests.add(1, &attributes);
        self.duration.record(elapsed.as_secs_f64(), &attributes);
    }
}

/// Axum middleware recording a counter and a duration sample per request
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    // Matched route template, not the raw path, to keep attribute cardinality bounded
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(req).await;
    state
        .metrics
        .record(&method, &route, response.status(), start.elapsed());

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_metrics() {
        // Global meter is a no-op without an installed provider; recording
        // must still be callable without panicking.
        let metrics = RequestMetrics::new(&opentelemetry::global::meter("test"));
        metrics.record(
            &Method::GET,
            "/tasks",
            StatusCode::OK,
            Duration::from_millis(12),
        );
        metrics.record(
            &Method::DELETE,
            "/tasks/:id",
            StatusCode::NOT_FOUND,
            Duration::from_millis(3),
        );
    }
}
