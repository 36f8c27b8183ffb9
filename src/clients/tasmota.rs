//! HTTP adapter for a Tasmota-flashed lamp (`GET /cm?cmnd=<command>`).
//!
//! Commands are at-most-once: a failed request is logged and dropped. After
//! a command lands, a status refresh is scheduled because the device applies
//! commands asynchronously and answers before the new state is visible.

use std::time::{Duration, Instant};

use reqwest::Client;
use thiserror::Error;

use crate::domain::lamp::DeviceStatus;
use crate::domain::LampCommand;
use crate::infra::runtime::limits::{make_http_client, DEVICE_TIMEOUT};
use crate::infra::runtime::state::{AgentState, DragGuard};

pub const REFRESH_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device unreachable: {0}")]
    Unreachable(String),
    #[error("device answered status {0}")]
    Status(u16),
    #[error("unreadable device status: {0}")]
    Decode(String),
}

#[derive(Clone)]
pub struct TasmotaClient {
    base: String,
    http: Client,
    state: AgentState,
    refresh_delay: Duration,
}

impl TasmotaClient {
    pub fn new(base: impl Into<String>, state: AgentState) -> Self {
        Self {
            base: base.into(),
            http: make_http_client(DEVICE_TIMEOUT),
            state,
            refresh_delay: REFRESH_DELAY,
        }
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    async fn get(&self, cmd: &LampCommand) -> Result<reqwest::Response, DeviceError> {
        let url = format!("{}/cm", self.base.trim_end_matches('/'));
        let resp = self
            .http
            .get(url)
            .query(&[("cmnd", cmd.to_string())])
            .send()
            .await
            .map_err(|e| DeviceError::Unreachable(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(DeviceError::Status(resp.status().as_u16()));
        }
        Ok(resp)
    }

    /// Issue one command. On success a status refresh follows after the
    /// refresh delay; on failure nothing is retried or queued.
    pub async fn send(&self, cmd: &LampCommand) -> Result<(), DeviceError> {
        tracing::info!(command = %cmd, "TX lamp");
        let start = Instant::now();
        match self.get(cmd).await {
            Ok(_) => {
                crate::infra::logging::log_metric(
                    "tasmota",
                    "command_latency_ms",
                    start.elapsed().as_millis() as f64,
                );
                self.schedule_refresh();
                Ok(())
            }
            Err(e) => {
                tracing::warn!(command = %cmd, error = %e, "lamp command failed");
                crate::infra::logging::log_metric("tasmota", "command_error_total", 1.0);
                Err(e)
            }
        }
    }

    fn schedule_refresh(&self) {
        let me = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(me.refresh_delay).await;
            if let Err(e) = me.poll_status().await {
                tracing::debug!(error = %e, "post-command refresh failed");
            }
        });
    }

    /// Read the device's state into the mirror. Returns `Ok(false)` without
    /// touching the network or the mirror while a manual adjustment is open.
    pub async fn poll_status(&self) -> Result<bool, DeviceError> {
        if self.state.is_dragging() {
            tracing::trace!("lamp poll skipped: drag in progress");
            return Ok(false);
        }
        let resp = self.get(&LampCommand::State).await?;
        let status: DeviceStatus = resp
            .json()
            .await
            .map_err(|e| DeviceError::Decode(e.to_string()))?;
        let applied = self.state.apply_polled(status.into());
        if applied {
            tracing::trace!(lamp = ?self.state.lamp(), "lamp state refreshed");
        }
        Ok(applied)
    }

    pub async fn toggle(&self) -> Result<(), DeviceError> {
        self.send(&LampCommand::PowerToggle).await
    }

    /// Start a manual adjustment gesture; polls are suppressed until the
    /// guard is handed back to `finish_adjust` (or dropped).
    pub fn begin_adjust(&self) -> DragGuard {
        self.state.begin_drag()
    }

    /// Release the gesture and send the value it settled on.
    pub async fn finish_adjust(&self, guard: DragGuard, cmd: LampCommand) -> Result<(), DeviceError> {
        drop(guard);
        self.send(&cmd).await
    }
}
