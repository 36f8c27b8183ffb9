use std::time::Duration;

/// Device endpoint: the lamp is on the LAN and answers fast or not at all.
pub const DEVICE_TIMEOUT: Duration = Duration::from_secs(3);
/// Station directory: a few MB of JSON from a public blob store.
pub const DIRECTORY_TIMEOUT: Duration = Duration::from_secs(10);
pub const WEATHER_TIMEOUT: Duration = Duration::from_secs(5);
pub const QUOTE_TIMEOUT: Duration = Duration::from_secs(8);

/// Build a reqwest client with a per-request timeout.
pub fn make_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(timeout.min(Duration::from_secs(2)))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default http client");
            reqwest::Client::new()
        })
}
