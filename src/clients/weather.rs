use reqwest::Client;
use serde::Deserialize;

use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::{make_http_client, WEATHER_TIMEOUT};

#[derive(Clone)]
pub struct WeatherClient {
    url: String,
    http: Client,
}

#[derive(Deserialize)]
struct WttrWire {
    current_condition: Vec<Condition>,
}

#[derive(Deserialize)]
struct Condition {
    #[serde(rename = "temp_C")]
    temp_c: String,
}

impl WeatherClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), http: make_http_client(WEATHER_TIMEOUT) }
    }

    /// Current temperature formatted for display, e.g. `台北:24°C`.
    pub async fn current(&self) -> Option<String> {
        let resp = add_standard_headers(self.http.get(&self.url)).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let wire: WttrWire = resp.json().await.ok()?;
        let temp = &wire.current_condition.first()?.temp_c;
        Some(format!("台北:{temp}°C"))
    }
}
