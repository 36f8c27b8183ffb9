use tokio::sync::watch;

use crate::api::mcp::SessionHandler;
use crate::clients::quotes::QuoteClient;
use crate::clients::tasmota::TasmotaClient;
use crate::clients::weather::WeatherClient;
use crate::core::error::AgentError;
use crate::core::mcp::ServerInfo;
use crate::infra::config::{redact_url, Config};
use crate::infra::pollers::{run_ambient, PeripheralPoller, AMBIENT_PERIOD};
use crate::infra::runtime::state::AgentState;
use crate::infra::ws::ConnectionManager;
use crate::tools::registry::build_registry;

/// Everything the agent runs, wired but not yet started.
pub struct Agent {
    pub cfg: Config,
    pub state: AgentState,
    pub manager: ConnectionManager,
    pub poller: PeripheralPoller,
}

pub fn assemble(cfg: Config) -> Result<Agent, AgentError> {
    cfg.validate()?;
    let url = cfg.mcp_url.clone().ok_or_else(|| AgentError::Config("MCP_URL not set".into()))?;
    let state = AgentState::default();
    let lamp = TasmotaClient::new(cfg.tasmota_url.clone(), state.clone());
    let registry = build_registry(&cfg, &state, lamp.clone())?;
    let handler = SessionHandler::new(
        registry,
        ServerInfo { name: cfg.server_name.clone(), version: cfg.server_version.clone() },
    );
    let manager = ConnectionManager::new(url, handler, cfg.ping_interval(), cfg.reconnect_delay());
    let poller = PeripheralPoller::new(
        lamp,
        WeatherClient::new(cfg.weather_url.clone()),
        QuoteClient::new(cfg.quote_base_url.clone()),
        cfg.peripheral_every,
    );
    Ok(Agent { cfg, state, manager, poller })
}

pub async fn run_agent() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let agent = assemble(cfg)?;
    tracing::info!(
        url = %redact_url(agent.cfg.mcp_url.as_deref().unwrap_or_default()),
        lamp = %agent.cfg.tasmota_url,
        server = %agent.cfg.server_name,
        "BOOT lamp-mcp-agent"
    );

    let (tx, rx) = watch::channel(false);
    let poll_period = agent.cfg.poll_interval();
    let poller = tokio::spawn(agent.poller.run(poll_period, rx.clone()));
    let ambient = tokio::spawn(run_ambient(agent.state.clone(), AMBIENT_PERIOD, rx.clone()));
    let conn = tokio::spawn(agent.manager.run(rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    let _ = tx.send(true);
    let _ = tokio::join!(conn, poller, ambient);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assemble_requires_gateway_url() {
        let err = assemble(Config::default()).err().unwrap();
        assert!(err.to_string().contains("MCP_URL not set"));
    }

    #[test]
    fn assemble_wires_configured_identity() {
        let cfg = Config { mcp_url: Some("wss://gw.example/mcp?token=abc".into()), ..Config::default() };
        let agent = assemble(cfg).unwrap();
        assert_eq!(agent.cfg.server_name, "ESP32-Pro-Stock-v2.1");
        assert_eq!(agent.state.ambient(), 25.0);
    }
}
