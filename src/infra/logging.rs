pub fn init() {
    // Honour RUST_LOG when set, otherwise info.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

/// Emit a metric both as a structured log line and to the `metrics` recorder.
pub fn log_metric(component: &'static str, metric: &'static str, value: f64) {
    tracing::debug!(component = component, metric = metric, value = value, "metric");
    if metric.ends_with("_total") {
        metrics::counter!(metric, "component" => component).increment(value as u64);
    } else {
        metrics::histogram!(metric, "component" => component).record(value);
    }
}
