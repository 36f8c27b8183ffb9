//! Station directory client and multi-token station search.

use std::time::Instant;

use reqwest::Client;
use thiserror::Error;

use crate::domain::normalize;
use crate::domain::station::{display_name, StationWire};
use crate::domain::StationMatch;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::{make_http_client, DIRECTORY_TIMEOUT};

pub const MAX_MATCHES: usize = 10;

/// The directory could not be read. Distinct from an empty match list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("API Error {0}")]
    Status(u16),
    #[error("{0}")]
    Transport(String),
    #[error("unreadable directory: {0}")]
    Decode(String),
}

#[derive(Clone)]
pub struct YouBikeClient {
    url: String,
    http: Client,
}

impl YouBikeClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), http: make_http_client(DIRECTORY_TIMEOUT) }
    }

    async fn fetch(&self) -> Result<Vec<StationWire>, SearchError> {
        let resp = add_standard_headers(self.http.get(&self.url))
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(SearchError::Status(resp.status().as_u16()));
        }
        let rows = resp
            .json::<Vec<serde_json::Value>>()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        let total = rows.len();
        let stations: Vec<StationWire> = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect();
        if stations.len() < total {
            tracing::debug!(skipped = total - stations.len(), "unreadable directory rows skipped");
        }
        Ok(stations)
    }

    /// Fetch the directory fresh and return up to `MAX_MATCHES` stations
    /// whose name contains every keyword token, in directory order.
    ///
    /// `city` is accepted for the tool contract; the feed is single-city.
    pub async fn search(&self, city: &str, keyword: &str) -> Result<Vec<StationMatch>, SearchError> {
        tracing::debug!(url = %self.url, city = %city, "fetching station directory");
        let start = Instant::now();
        let stations = match self.fetch().await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "station directory fetch failed");
                crate::infra::logging::log_metric("youbike", "remote_error_total", 1.0);
                return Err(e);
            }
        };
        crate::infra::logging::log_metric(
            "youbike",
            "remote_latency_ms",
            start.elapsed().as_millis() as f64,
        );
        tracing::debug!(count = stations.len(), "station directory fetched");

        let matches = match_stations(stations, keyword);
        tracing::info!(keyword = %keyword, matches = matches.len(), "station search");
        Ok(matches)
    }
}

/// Conjunctive substring match over normalized names. A keyword with no
/// tokens matches every station.
pub fn match_stations(stations: Vec<StationWire>, keyword: &str) -> Vec<StationMatch> {
    let normalized = normalize(keyword);
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    stations
        .into_iter()
        .filter(|st| {
            let name = normalize(&display_name(&st.sna));
            tokens.iter().all(|t| name.contains(t))
        })
        .take(MAX_MATCHES)
        .map(StationMatch::from)
        .collect()
}
