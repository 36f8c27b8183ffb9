use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::core::error::AgentError;

pub const DEFAULT_TASMOTA_IP: &str = "192.168.0.238";
pub const DEFAULT_YOUBIKE_URL: &str =
    "https://tcgbusfs.blob.core.windows.net/dotapp/youbike/v2/youbike_immediate.json";
pub const DEFAULT_QUOTE_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_WEATHER_URL: &str = "https://wttr.in/Taipei?format=j1";
pub const DEFAULT_CONFIG_PATH: &str = "agent.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Gateway endpoint; carries the bearer token in its query string.
    pub mcp_url: Option<String>,
    pub tasmota_url: String,
    pub youbike_url: String,
    pub quote_base_url: String,
    pub weather_url: String,
    pub ping_interval_secs: u64,
    pub reconnect_delay_secs: u64,
    pub poll_interval_secs: u64,
    /// Weather and quotes refresh every this many poll ticks.
    pub peripheral_every: u64,
    pub server_name: String,
    pub server_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mcp_url: None,
            tasmota_url: format!("http://{DEFAULT_TASMOTA_IP}"),
            youbike_url: DEFAULT_YOUBIKE_URL.into(),
            quote_base_url: DEFAULT_QUOTE_BASE_URL.into(),
            weather_url: DEFAULT_WEATHER_URL.into(),
            ping_interval_secs: 5,
            reconnect_delay_secs: 3,
            poll_interval_secs: 5,
            peripheral_every: 12,
            server_name: "ESP32-Pro-Stock-v2.1".into(),
            server_version: "11.1".into(),
        }
    }
}

/// Optional on-disk layer. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    mcp_url: Option<String>,
    tasmota_url: Option<String>,
    tasmota_ip: Option<String>,
    youbike_url: Option<String>,
    quote_base_url: Option<String>,
    weather_url: Option<String>,
    ping_interval_secs: Option<u64>,
    reconnect_delay_secs: Option<u64>,
    poll_interval_secs: Option<u64>,
    peripheral_every: Option<u64>,
    server_name: Option<String>,
    server_version: Option<String>,
}

fn env_str(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.parse::<u64>().ok())
}

impl Config {
    /// Defaults overlaid by the TOML file (if present) and then the environment.
    pub fn load() -> Result<Self, AgentError> {
        let explicit = env_str("AGENT_CONFIG");
        let path = explicit.clone().unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
        let mut cfg = Config::default();
        let exists = Path::new(&path).exists();
        if explicit.is_some() && !exists {
            return Err(AgentError::Config(format!("AGENT_CONFIG points at missing file {path}")));
        }
        if exists {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| AgentError::Config(format!("reading {path}: {e}")))?;
            cfg = cfg.merge_toml(&raw)?;
            tracing::debug!(path = %path, "loaded config file");
        }
        Ok(cfg.merge_env())
    }

    pub fn from_env() -> Self {
        Config::default().merge_env()
    }

    fn merge_toml(mut self, raw: &str) -> Result<Self, AgentError> {
        let f: FileConfig =
            toml::from_str(raw).map_err(|e| AgentError::Config(format!("invalid toml: {e}")))?;
        if let Some(v) = f.mcp_url {
            self.mcp_url = Some(v);
        }
        if let Some(ip) = f.tasmota_ip {
            self.tasmota_url = format!("http://{ip}");
        }
        if let Some(v) = f.tasmota_url {
            self.tasmota_url = v;
        }
        self.youbike_url = f.youbike_url.unwrap_or(self.youbike_url);
        self.quote_base_url = f.quote_base_url.unwrap_or(self.quote_base_url);
        self.weather_url = f.weather_url.unwrap_or(self.weather_url);
        self.ping_interval_secs = f.ping_interval_secs.unwrap_or(self.ping_interval_secs);
        self.reconnect_delay_secs = f.reconnect_delay_secs.unwrap_or(self.reconnect_delay_secs);
        self.poll_interval_secs = f.poll_interval_secs.unwrap_or(self.poll_interval_secs);
        self.peripheral_every = f.peripheral_every.unwrap_or(self.peripheral_every);
        self.server_name = f.server_name.unwrap_or(self.server_name);
        self.server_version = f.server_version.unwrap_or(self.server_version);
        Ok(self)
    }

    fn merge_env(mut self) -> Self {
        if let Some(v) = env_str("MCP_URL") {
            self.mcp_url = Some(v);
        }
        if let Some(ip) = env_str("TASMOTA_IP") {
            self.tasmota_url = format!("http://{ip}");
        }
        if let Some(v) = env_str("TASMOTA_URL") {
            self.tasmota_url = v;
        }
        self.youbike_url = env_str("YOUBIKE_URL").unwrap_or(self.youbike_url);
        self.quote_base_url = env_str("QUOTE_BASE_URL").unwrap_or(self.quote_base_url);
        self.weather_url = env_str("WEATHER_URL").unwrap_or(self.weather_url);
        self.ping_interval_secs = env_u64("PING_INTERVAL_SECS").unwrap_or(self.ping_interval_secs);
        self.reconnect_delay_secs =
            env_u64("RECONNECT_DELAY_SECS").unwrap_or(self.reconnect_delay_secs);
        self.poll_interval_secs = env_u64("POLL_INTERVAL_SECS").unwrap_or(self.poll_interval_secs);
        self.peripheral_every = env_u64("PERIPHERAL_EVERY").unwrap_or(self.peripheral_every);
        self.server_name = env_str("SERVER_NAME").unwrap_or(self.server_name);
        self.server_version = env_str("SERVER_VERSION").unwrap_or(self.server_version);
        self
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        let Some(raw) = self.mcp_url.as_deref() else {
            return Err(AgentError::Config("MCP_URL not set".into()));
        };
        let parsed = url::Url::parse(raw)
            .map_err(|e| AgentError::Config(format!("MCP_URL is not a URL: {e}")))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(AgentError::Config(format!(
                "MCP_URL must use ws:// or wss://, got {}://",
                parsed.scheme()
            )));
        }
        for (name, v) in [
            ("PING_INTERVAL_SECS", self.ping_interval_secs),
            ("RECONNECT_DELAY_SECS", self.reconnect_delay_secs),
            ("POLL_INTERVAL_SECS", self.poll_interval_secs),
            ("PERIPHERAL_EVERY", self.peripheral_every),
        ] {
            if v == 0 {
                return Err(AgentError::Config(format!("{name} cannot be 0")));
            }
        }
        Ok(())
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Gateway URL with the query string (and its token) removed, for logs.
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut u) => {
            let had_query = u.query().is_some();
            u.set_query(None);
            if had_query {
                format!("{u}?<redacted>")
            } else {
                u.to_string()
            }
        }
        Err(_) => "<invalid url>".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 8] = [
        "AGENT_CONFIG",
        "MCP_URL",
        "TASMOTA_IP",
        "TASMOTA_URL",
        "PING_INTERVAL_SECS",
        "RECONNECT_DELAY_SECS",
        "POLL_INTERVAL_SECS",
        "SERVER_NAME",
    ];

    fn clear_env() {
        for v in VARS {
            std::env::remove_var(v);
        }
    }

    #[test]
    #[serial]
    fn defaults_match_device_and_protocol_timings() {
        clear_env();
        let cfg = Config::from_env();
        assert_eq!(cfg.mcp_url, None);
        assert_eq!(cfg.tasmota_url, "http://192.168.0.238");
        assert_eq!(cfg.ping_interval(), Duration::from_secs(5));
        assert_eq!(cfg.reconnect_delay(), Duration::from_secs(3));
        assert_eq!(cfg.peripheral_every, 12);
    }

    #[test]
    #[serial]
    fn parses_env_overrides() {
        clear_env();
        std::env::set_var("MCP_URL", "wss://gw.example/mcp/?token=abc");
        std::env::set_var("TASMOTA_IP", "10.0.0.9");
        std::env::set_var("RECONNECT_DELAY_SECS", "7");
        std::env::set_var("SERVER_NAME", "desk-lamp");
        let cfg = Config::from_env();
        assert_eq!(cfg.mcp_url.as_deref(), Some("wss://gw.example/mcp/?token=abc"));
        assert_eq!(cfg.tasmota_url, "http://10.0.0.9");
        assert_eq!(cfg.reconnect_delay_secs, 7);
        assert_eq!(cfg.server_name, "desk-lamp");
        assert!(cfg.validate().is_ok());
        clear_env();
    }

    #[test]
    #[serial]
    fn env_wins_over_file() {
        clear_env();
        std::env::set_var("PING_INTERVAL_SECS", "9");
        let cfg = Config::default()
            .merge_toml("ping_interval_secs = 2\ntasmota_ip = \"10.1.1.1\"\n")
            .unwrap()
            .merge_env();
        assert_eq!(cfg.ping_interval_secs, 9);
        assert_eq!(cfg.tasmota_url, "http://10.1.1.1");
        clear_env();
    }

    #[test]
    #[serial]
    fn explicit_config_path_must_exist() {
        clear_env();
        std::env::set_var("AGENT_CONFIG", "/nonexistent/agent.toml");
        let err = Config::load().unwrap_err();
        assert!(err.to_string().contains("missing file /nonexistent/agent.toml"));
        clear_env();
    }

    #[test]
    #[serial]
    fn explicit_config_file_is_layered_under_env() {
        clear_env();
        let path = std::env::temp_dir().join(format!("lamp-agent-{}.toml", std::process::id()));
        std::fs::write(&path, "tasmota_ip = \"10.2.2.2\"\npoll_interval_secs = 11\n").unwrap();
        std::env::set_var("AGENT_CONFIG", &path);
        std::env::set_var("POLL_INTERVAL_SECS", "4");
        let cfg = Config::load().unwrap();
        assert_eq!(cfg.tasmota_url, "http://10.2.2.2");
        assert_eq!(cfg.poll_interval_secs, 4);
        std::fs::remove_file(&path).unwrap();
        clear_env();
    }

    #[test]
    fn rejects_unknown_toml_keys() {
        let err = Config::default().merge_toml("tasmota_port = 80").unwrap_err();
        assert!(err.to_string().contains("invalid toml"));
    }

    #[test]
    fn validate_requires_websocket_url() {
        let mut cfg = Config::default();
        assert!(cfg.validate().unwrap_err().to_string().contains("MCP_URL not set"));
        cfg.mcp_url = Some("https://gw.example/mcp".into());
        assert!(cfg.validate().unwrap_err().to_string().contains("ws://"));
        cfg.mcp_url = Some("ws://127.0.0.1:9000/".into());
        cfg.poll_interval_secs = 0;
        assert!(cfg.validate().unwrap_err().to_string().contains("POLL_INTERVAL_SECS"));
    }

    #[test]
    fn redaction_hides_token() {
        let r = redact_url("wss://api.example.me/mcp/?token=secret.jwt");
        assert_eq!(r, "wss://api.example.me/mcp/?<redacted>");
        assert!(!r.contains("secret"));
        assert_eq!(redact_url("ws://127.0.0.1:1234/"), "ws://127.0.0.1:1234/");
    }
}
