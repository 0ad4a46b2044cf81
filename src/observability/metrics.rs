use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec, TextEncoder,
};

// Metrics registry
static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap()
});

static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request latency in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0, 5.0]
    )
    .unwrap()
});

static LOGINS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "logins_total",
        "Total number of login attempts",
        &["outcome", "role"]
    )
    .unwrap()
});

static NAVIGATION_DECISIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "navigation_decisions_total",
        "Total number of navigation decisions",
        &["requested_view", "decision"]
    )
    .unwrap()
});

static REPORTS_SUBMITTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "activity_reports_submitted_total",
        "Total number of activity reports submitted through the form"
    )
    .unwrap()
});

static REPORTS_IMPORTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "activity_reports_imported_total",
        "Total number of spreadsheet rows processed by import",
        &["result"]
    )
    .unwrap()
});

pub struct MetricsRecorder;

impl MetricsRecorder {
    pub fn record_http_request(method: &str, path: &str, status: u16) {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&[method, path, &status.to_string()])
            .inc();
    }

    pub fn record_http_duration(method: &str, path: &str, duration: f64) {
        HTTP_REQUEST_DURATION
            .with_label_values(&[method, path])
            .observe(duration);
    }

    pub fn record_login(outcome: &str, role: &str) {
        LOGINS_TOTAL.with_label_values(&[outcome, role]).inc();
    }

    pub fn record_navigation(requested_view: &str, decision: &str) {
        NAVIGATION_DECISIONS_TOTAL
            .with_label_values(&[requested_view, decision])
            .inc();
    }

    pub fn record_report_submitted() {
        REPORTS_SUBMITTED_TOTAL.inc();
    }

    pub fn record_import(accepted: usize, rejected: usize) {
        REPORTS_IMPORTED_TOTAL
            .with_label_values(&["accepted"])
            .inc_by(accepted as u64);
        REPORTS_IMPORTED_TOTAL
            .with_label_values(&["rejected"])
            .inc_by(rejected as u64);
    }

    /// Export all metrics in Prometheus format
    pub fn export() -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = prometheus::gather();
        encoder.encode_to_string(&metric_families)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_contains_recorded_series() {
        MetricsRecorder::record_login("success", "regular");
        MetricsRecorder::record_report_submitted();

        let text = MetricsRecorder::export().unwrap();
        assert!(text.contains("logins_total"));
        assert!(text.contains("activity_reports_submitted_total"));
    }
}
