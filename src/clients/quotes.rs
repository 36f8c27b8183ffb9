//! Daily quote history from the Yahoo chart API.

use reqwest::Client;
use serde::Deserialize;

use crate::domain::quote::{qualify_symbol, Quote};
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::{make_http_client, QUOTE_TIMEOUT};

#[derive(Clone)]
pub struct QuoteClient {
    base: String,
    http: Client,
}

#[derive(Deserialize)]
struct ChartWire {
    chart: ChartBody,
}

#[derive(Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Bars>,
}

/// Parallel arrays, one slot per trading day; slots may be null.
#[derive(Deserialize, Default)]
struct Bars {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl Bars {
    /// Most recent day with a close price.
    fn last_quote(&self, symbol: &str) -> Option<Quote> {
        let i = self.close.iter().rposition(|c| c.is_some())?;
        let at = |v: &Vec<Option<f64>>| v.get(i).copied().flatten();
        Some(Quote {
            symbol: symbol.to_string(),
            price: at(&self.close)?,
            open: at(&self.open).unwrap_or_default(),
            high: at(&self.high).unwrap_or_default(),
            low: at(&self.low).unwrap_or_default(),
            volume_lots: (at(&self.volume).unwrap_or_default() / 1000.0) as u64,
        })
    }
}

impl QuoteClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into(), http: make_http_client(QUOTE_TIMEOUT) }
    }

    /// Latest daily bar over the past five days, or `None` when the symbol
    /// is unknown or the source is unavailable.
    pub async fn fetch(&self, symbol: &str) -> Option<Quote> {
        let qualified = qualify_symbol(symbol.trim());
        let url = format!("{}/v8/finance/chart/{}", self.base.trim_end_matches('/'), qualified);
        let resp = add_standard_headers(self.http.get(url))
            .query(&[("range", "5d"), ("interval", "1d")])
            .send()
            .await;
        let resp = match resp {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::debug!(symbol = %qualified, status = %r.status(), "quote lookup rejected");
                return None;
            }
            Err(e) => {
                tracing::warn!(symbol = %qualified, error = %e, "quote fetch failed");
                return None;
            }
        };
        let wire: ChartWire = match resp.json().await {
            Ok(w) => w,
            Err(e) => {
                tracing::warn!(symbol = %qualified, error = %e, "quote body unreadable");
                return None;
            }
        };
        let display = qualified.trim_end_matches(".TW");
        wire.chart
            .result?
            .first()?
            .indicators
            .quote
            .first()?
            .last_quote(display)
    }
}
