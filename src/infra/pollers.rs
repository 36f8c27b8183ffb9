//! Background loops: lamp/peripheral polling and the ambient sensor walk.

use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;

use crate::clients::quotes::QuoteClient;
use crate::clients::tasmota::TasmotaClient;
use crate::clients::weather::WeatherClient;
use crate::domain::quote::{format_quote, QUOTE_FAILED, WATCHLIST};
use crate::infra::runtime::state::AgentState;

pub const AMBIENT_PERIOD: Duration = Duration::from_secs(1);
pub const AMBIENT_STEP: f64 = 0.1;

#[derive(Clone)]
pub struct PeripheralPoller {
    lamp: TasmotaClient,
    weather: WeatherClient,
    quotes: QuoteClient,
    /// Weather and quotes refresh on every n-th tick.
    every: u64,
}

impl PeripheralPoller {
    pub fn new(lamp: TasmotaClient, weather: WeatherClient, quotes: QuoteClient, every: u64) -> Self {
        Self { lamp, weather, quotes, every: every.max(1) }
    }

    fn state(&self) -> &AgentState {
        self.lamp.state()
    }

    /// Weather plus the watchlist. A failed weather read keeps the last value.
    pub async fn refresh_peripherals(&self) {
        match self.weather.current().await {
            Some(text) => self.state().set_weather(text),
            None => tracing::debug!("weather unavailable; keeping last reading"),
        }
        for (symbol, _) in WATCHLIST {
            let text = match self.quotes.fetch(symbol).await {
                Some(q) => format_quote(&q),
                None => QUOTE_FAILED.to_string(),
            };
            self.state().set_quote(symbol, text);
        }
    }

    /// One poll cycle. Tick 0 always includes the peripheral refresh.
    pub async fn tick(&self, n: u64) {
        if let Err(e) = self.lamp.poll_status().await {
            tracing::debug!(error = %e, "lamp poll failed");
        }
        if n % self.every == 0 {
            self.refresh_peripherals().await;
        }
    }

    pub async fn run(self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut n: u64 = 0;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick(n).await;
                    n = n.wrapping_add(1);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("peripheral poller stopped");
    }
}

/// Random walk of the simulated room temperature.
pub async fn run_ambient(state: AgentState, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let delta = rand::thread_rng().gen_range(-AMBIENT_STEP..=AMBIENT_STEP);
                let v = state.step_ambient(delta);
                tracing::trace!(ambient = v, "ambient step");
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::QUOTE_LOADING;
    use crate::domain::{LampState, Power};
    use httpmock::prelude::*;
    use serde_json::json;

    fn chart(close: f64) -> serde_json::Value {
        json!({"chart":{"result":[{"indicators":{"quote":[{
            "open":[close], "high":[close], "low":[close], "close":[close], "volume":[5000.0]
        }]}}]}})
    }

    fn poller(server: &MockServer, state: AgentState, every: u64) -> PeripheralPoller {
        let lamp = TasmotaClient::new(server.base_url(), state);
        PeripheralPoller::new(
            lamp,
            WeatherClient::new(server.url("/Taipei")),
            QuoteClient::new(server.base_url()),
            every,
        )
    }

    #[tokio::test]
    async fn first_tick_refreshes_everything() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cm").query_param("cmnd", "State");
            then.status(200).json_body(json!({"POWER":"ON","Dimmer":40,"CT":200}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/Taipei");
            then.status(200).json_body(json!({"current_condition":[{"temp_C":"27"}]}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v8/finance/chart/2330.TW");
            then.status(200).json_body(chart(1000.0));
        });
        server.mock(|when, then| {
            when.method(GET).path("/v8/finance/chart/2454.TW");
            then.status(500);
        });

        let state = AgentState::default();
        poller(&server, state.clone(), 12).tick(0).await;

        assert_eq!(state.lamp(), LampState { power: Power::On, dimmer: 40, ct: 200 });
        assert_eq!(state.weather().as_deref(), Some("台北:27°C"));
        let quotes = state.quotes();
        assert_eq!(quotes[0].text, "2330: 1000.00 (開:1000.00 高:1000.00 低:1000.00 量:5張)");
        assert_eq!(quotes[1].text, QUOTE_FAILED);
    }

    #[tokio::test]
    async fn off_ticks_only_poll_the_lamp() {
        let server = MockServer::start();
        let lamp = server.mock(|when, then| {
            when.method(GET).path("/cm");
            then.status(200).json_body(json!({"POWER":"OFF","Dimmer":0,"CT":153}));
        });
        let weather = server.mock(|when, then| {
            when.method(GET).path("/Taipei");
            then.status(200).json_body(json!({"current_condition":[{"temp_C":"20"}]}));
        });

        let state = AgentState::default();
        let p = poller(&server, state.clone(), 12);
        for n in 1..12 {
            p.tick(n).await;
        }
        lamp.assert_hits(11);
        weather.assert_hits(0);
        assert_eq!(state.quotes()[0].text, QUOTE_LOADING);
    }

    #[tokio::test]
    async fn ambient_walk_stops_on_shutdown() {
        let state = AgentState::default();
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(run_ambient(state.clone(), Duration::from_millis(5), rx));
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        task.await.unwrap();
        let v = state.ambient();
        assert!((v - 25.0).abs() <= 1.0 + 1e-9);
        assert_eq!((v * 100.0).round() / 100.0, v);
    }
}
