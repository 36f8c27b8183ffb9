use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::clients::quotes::QuoteClient;
use crate::clients::tasmota::TasmotaClient;
use crate::clients::youbike::YouBikeClient;
use crate::domain::lamp::{BRIGHTNESS_MAX, CT_COOLEST, CT_WARMEST};
use crate::domain::quote::format_quote;
use crate::domain::LampCommand;
use crate::infra::config::{redact_url, Config};
use crate::infra::runtime::state::AgentState;
use crate::tools::youbike::{format_matches, NOT_FOUND_TEXT};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "lamp-mcp-agent")]
#[command(about = "Desk lamp MCP agent")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Connect to the gateway and serve tools (default)
    Run,
    /// Validate configuration
    Config {
        /// Validate config without starting the agent
        #[arg(long)]
        validate: bool,
    },
    /// Drive the lamp directly
    Lamp {
        #[command(subcommand)]
        action: LampAction,
    },
    /// Search YouBike stations
    Youbike {
        keyword: String,
        #[arg(long, default_value = "台北市")]
        city: String,
    },
    /// Look up a stock quote
    Stock { symbol: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum LampAction {
    Toggle,
    On {
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=(BRIGHTNESS_MAX as i64)))]
        brightness: Option<u8>,
        #[arg(long, value_parser = clap::value_parser!(u16).range((CT_WARMEST as i64)..=(CT_COOLEST as i64)))]
        ct: Option<u16>,
    },
    Off,
    Status,
    /// Set brightness as a manual adjustment
    Dimmer {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=(BRIGHTNESS_MAX as i64)))]
        value: u8,
    },
    /// Set colour temperature as a manual adjustment
    Ct {
        #[arg(value_parser = clap::value_parser!(u16).range((CT_WARMEST as i64)..=(CT_COOLEST as i64)))]
        value: u16,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    run_commands(cli.command.unwrap_or(Commands::Run)).await
}

pub async fn run_commands(command: Commands) -> ExitCode {
    match command {
        Commands::Run => match crate::infra::boot::run_agent().await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!(error = %e, "agent exited");
                eprintln!("❌ {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Config { validate: _ } => match validate_config() {
            Ok(summary) => {
                println!("{}", summary);
                println!("✅ Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ Configuration validation failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Lamp { action } => match load().map(|cfg| cfg.tasmota_url) {
            Ok(base) => match lamp(&base, action).await {
                Ok(out) => {
                    println!("💡 {}", out);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("❌ Lamp command failed: {}", e);
                    ExitCode::FAILURE
                }
            },
            Err(e) => {
                eprintln!("❌ {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Youbike { keyword, city } => match load() {
            Ok(cfg) => match youbike(&cfg.youbike_url, &city, &keyword).await {
                Ok(out) => {
                    println!("{}", out);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("❌ 查詢錯誤: {}", e);
                    ExitCode::FAILURE
                }
            },
            Err(e) => {
                eprintln!("❌ {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Stock { symbol } => match load() {
            Ok(cfg) => match stock(&cfg.quote_base_url, &symbol).await {
                Some(out) => {
                    println!("📈 {}", out);
                    ExitCode::SUCCESS
                }
                None => {
                    eprintln!("❌ 查無 {}", symbol);
                    ExitCode::FAILURE
                }
            },
            Err(e) => {
                eprintln!("❌ {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn load() -> CliResult<Config> {
    Ok(Config::load()?)
}

fn validate_config() -> CliResult<String> {
    let cfg = load()?;
    cfg.validate()?;
    let url = cfg.mcp_url.as_deref().map(redact_url).unwrap_or_default();
    Ok(format!(
        "📋 Configuration:\n  Gateway: {}\n  Lamp: {}\n  Ping/Reconnect/Poll: {}s/{}s/{}s\n  Server: {} {}",
        url,
        cfg.tasmota_url,
        cfg.ping_interval_secs,
        cfg.reconnect_delay_secs,
        cfg.poll_interval_secs,
        cfg.server_name,
        cfg.server_version
    ))
}

async fn lamp(base: &str, action: LampAction) -> CliResult<String> {
    let client = TasmotaClient::new(base, AgentState::default());
    match action {
        LampAction::Toggle => client.toggle().await?,
        LampAction::On { brightness, ct } => client.send(&LampCommand::power_on_with(brightness, ct)).await?,
        LampAction::Off => client.send(&LampCommand::shutdown()).await?,
        LampAction::Dimmer { value } => {
            let guard = client.begin_adjust();
            client.finish_adjust(guard, LampCommand::Dimmer(value)).await?
        }
        LampAction::Ct { value } => {
            let guard = client.begin_adjust();
            client.finish_adjust(guard, LampCommand::Ct(value)).await?
        }
        LampAction::Status => {}
    }
    client.poll_status().await?;
    let s = client.state().lamp();
    Ok(format!("Power:{} Dimmer:{} CT:{}", s.power, s.dimmer, s.ct))
}

async fn youbike(url: &str, city: &str, keyword: &str) -> CliResult<String> {
    let matches = YouBikeClient::new(url).search(city, keyword).await?;
    if matches.is_empty() {
        return Ok(NOT_FOUND_TEXT.to_string());
    }
    Ok(format_matches(&matches))
}

async fn stock(base: &str, symbol: &str) -> Option<String> {
    QuoteClient::new(base).fetch(symbol).await.map(|q| format_quote(&q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use serial_test::serial;
    use std::env;

    #[test]
    fn bare_invocation_means_run() {
        let cli = Cli::try_parse_from(["lamp-mcp-agent"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn lamp_on_parses_and_bounds_arguments() {
        let cli = Cli::try_parse_from(["lamp-mcp-agent", "lamp", "on", "-b", "80", "--ct", "300"]).unwrap();
        match cli.command {
            Some(Commands::Lamp { action }) => {
                assert_eq!(action, LampAction::On { brightness: Some(80), ct: Some(300) })
            }
            _ => panic!("expected lamp on"),
        }
        assert!(Cli::try_parse_from(["lamp-mcp-agent", "lamp", "dimmer", "101"]).is_err());
        assert!(Cli::try_parse_from(["lamp-mcp-agent", "lamp", "ct", "100"]).is_err());
    }

    #[test]
    #[serial]
    fn validate_config_requires_ws_url() {
        env::remove_var("AGENT_CONFIG");
        env::remove_var("MCP_URL");
        assert!(validate_config().is_err());

        env::set_var("MCP_URL", "wss://gw.example/mcp?token=secret");
        let summary = validate_config().unwrap();
        assert!(summary.contains("wss://gw.example/mcp?<redacted>"));
        assert!(!summary.contains("secret"));

        env::remove_var("MCP_URL");
    }

    #[tokio::test]
    async fn lamp_status_reads_device() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/cm").query_param("cmnd", "State");
            then.status(200).json_body(json!({"POWER":"ON","Dimmer":55,"CT":320}));
        });
        let out = lamp(&server.base_url(), LampAction::Status).await.unwrap();
        assert_eq!(out, "Power:ON Dimmer:55 CT:320");
    }

    #[tokio::test]
    async fn lamp_dimmer_sends_single_command() {
        let server = MockServer::start();
        let set = server.mock(|when, then| {
            when.method(GET).path("/cm").query_param("cmnd", "Dimmer 30");
            then.status(200).json_body(json!({"Dimmer":30}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/cm").query_param("cmnd", "State");
            then.status(200).json_body(json!({"POWER":"ON","Dimmer":30,"CT":153}));
        });
        let out = lamp(&server.base_url(), LampAction::Dimmer { value: 30 }).await.unwrap();
        set.assert();
        assert!(out.contains("Dimmer:30"));
    }

    #[tokio::test]
    async fn lamp_unreachable_is_error() {
        assert!(lamp("http://127.0.0.1:9", LampAction::Toggle).await.is_err());
    }

    #[tokio::test]
    async fn youbike_prints_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/yb");
            then.status(200).json_body(json!([
                {"sna":"YouBike2.0_捷運市政府站","available_rent_bikes":3,"available_return_bikes":9}
            ]));
        });
        let out = youbike(&server.url("/yb"), "台北市", "淡水").await.unwrap();
        assert_eq!(out, NOT_FOUND_TEXT);
        let out = youbike(&server.url("/yb"), "台北市", "市政府").await.unwrap();
        assert!(out.contains("捷運市政府站"));
    }
}
