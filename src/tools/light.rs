use async_trait::async_trait;
use serde_json::json;

use crate::clients::tasmota::TasmotaClient;
use crate::core::error::ToolError;
use crate::core::tool::{Tool, ToolName, ToolSpec};
use crate::domain::lamp::{BRIGHTNESS_MAX, CT_COOLEST, CT_WARMEST};
use crate::domain::{LampCommand, LampState, Power};
use crate::tools::args::{optional_int, required_str};

pub const LIGHT_OFF_TEXT: &str = "檯燈已徹底關閉 (狀態歸零)";
pub const LIGHT_SET_TEXT: &str = "檯燈設定完成";

pub struct ControlLightTool {
    lamp: TasmotaClient,
}

impl ControlLightTool {
    pub fn new(lamp: TasmotaClient) -> Self {
        Self { lamp }
    }
}

/// A parsed `control_light` request. Off carries no extras: it always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LightRequest {
    Off,
    On { brightness: Option<u8>, ct: Option<u16> },
}

impl LightRequest {
    fn parse(args: &serde_json::Value) -> Result<Self, ToolError> {
        match required_str(args, "state")? {
            "off" => Ok(LightRequest::Off),
            "on" => {
                let brightness = optional_int(args, "brightness", 0, BRIGHTNESS_MAX as i64)?.map(|v| v as u8);
                let ct = optional_int(args, "color_temp", CT_WARMEST as i64, CT_COOLEST as i64)?.map(|v| v as u16);
                Ok(LightRequest::On { brightness, ct })
            }
            other => Err(ToolError::InvalidArgument {
                field: "state",
                reason: format!("expected on or off, got {other}"),
            }),
        }
    }

    fn command(&self) -> LampCommand {
        match *self {
            LightRequest::Off => LampCommand::shutdown(),
            LightRequest::On { brightness, ct } => LampCommand::power_on_with(brightness, ct),
        }
    }

    /// State the lamp should reach once the command is applied.
    fn expected(&self, current: LampState) -> LampState {
        match *self {
            LightRequest::Off => LampState { power: Power::Off, dimmer: 0, ..current },
            LightRequest::On { brightness, ct } => LampState {
                power: Power::On,
                dimmer: brightness.unwrap_or(current.dimmer),
                ct: ct.unwrap_or(current.ct),
            },
        }
    }
}

impl ToolSpec for ControlLightTool {
    fn name(&self) -> ToolName {
        ToolName::ControlLight
    }
    fn description(&self) -> &'static str {
        "控制 Tasmota 檯燈 (開關/亮度/色溫)"
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "state": {"type": "string", "enum": ["on", "off"]},
                "brightness": {"type": "integer", "minimum": 0, "maximum": 100},
                "color_temp": {"type": "integer", "minimum": 153, "maximum": 500, "description": "色溫範圍153(暖)-500(冷)"}
            },
            "required": ["state"]
        })
    }
}

#[async_trait]
impl Tool for ControlLightTool {
    async fn call(&self, args: &serde_json::Value) -> Result<String, ToolError> {
        let req = LightRequest::parse(args)?;
        self.lamp
            .send(&req.command())
            .await
            .map_err(|e| ToolError::Upstream(format!("檯燈控制失敗: {e}")))?;
        let state = self.lamp.state();
        state.set_lamp(req.expected(state.lamp()));
        Ok(match req {
            LightRequest::Off => LIGHT_OFF_TEXT,
            LightRequest::On { .. } => LIGHT_SET_TEXT,
        }
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::runtime::state::AgentState;
    use httpmock::prelude::*;
    use std::time::Duration;

    fn tool(base: String) -> ControlLightTool {
        let lamp = TasmotaClient::new(base, AgentState::default()).with_refresh_delay(Duration::from_secs(60));
        ControlLightTool::new(lamp)
    }

    #[test]
    fn off_wins_over_other_fields() {
        let req = LightRequest::parse(&json!({"state":"off","brightness":80,"color_temp":300})).unwrap();
        assert_eq!(req, LightRequest::Off);
        let cmd = req.command().to_string();
        assert!(cmd.contains("Power Off"));
        assert!(cmd.contains("Dimmer 0"));
        assert!(!cmd.contains("Dimmer 80"));
        assert!(!cmd.contains("CT"));
    }

    #[test]
    fn off_ignores_out_of_range_extras() {
        let req = LightRequest::parse(&json!({"state":"off","brightness":900})).unwrap();
        assert_eq!(req, LightRequest::Off);
    }

    #[test]
    fn on_batches_in_power_brightness_color_order() {
        let req = LightRequest::parse(&json!({"state":"on","brightness":80,"color_temp":300})).unwrap();
        assert_eq!(req.command().to_string(), "Backlog Power On;Dimmer 80;CT 300");
    }

    #[test]
    fn rejects_bad_state_and_ranges() {
        assert!(LightRequest::parse(&json!({"state":"dim"})).is_err());
        assert!(LightRequest::parse(&json!({"brightness":3})).is_err());
        assert!(LightRequest::parse(&json!({"state":"on","brightness":101})).is_err());
        assert!(LightRequest::parse(&json!({"state":"on","color_temp":100})).is_err());
    }

    #[tokio::test]
    async fn off_sends_shutdown_and_zeroes_mirror() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/cm").query_param("cmnd", "Backlog Power Off;Dimmer 0;Color 0");
            then.status(200).json_body(json!({"POWER":"OFF"}));
        });
        let t = tool(server.base_url());
        t.lamp.state().set_lamp(LampState { power: Power::On, dimmer: 70, ct: 250 });

        let out = t.call(&json!({"state":"off","brightness":80,"color_temp":300})).await.unwrap();
        m.assert();
        assert_eq!(out, LIGHT_OFF_TEXT);
        assert_eq!(t.lamp.state().lamp(), LampState { power: Power::Off, dimmer: 0, ct: 250 });
    }

    #[tokio::test]
    async fn on_sends_one_batched_request() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(GET).path("/cm").query_param("cmnd", "Backlog Power On;Dimmer 80;CT 300");
            then.status(200).json_body(json!({"POWER":"ON"}));
        });
        let t = tool(server.base_url());
        let out = t.call(&json!({"state":"on","brightness":80,"color_temp":300})).await.unwrap();
        m.assert_hits(1);
        assert_eq!(out, LIGHT_SET_TEXT);
        assert_eq!(t.lamp.state().lamp(), LampState { power: Power::On, dimmer: 80, ct: 300 });
    }

    #[tokio::test]
    async fn unreachable_lamp_becomes_text_error() {
        let t = tool("http://127.0.0.1:9".into());
        let err = t.call(&json!({"state":"on"})).await.unwrap_err();
        assert!(err.to_string().starts_with("檯燈控制失敗"));
        assert_eq!(t.lamp.state().lamp(), LampState::default());
    }
}
