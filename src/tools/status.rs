use async_trait::async_trait;
use serde_json::json;

use crate::core::error::ToolError;
use crate::core::tool::{Tool, ToolName, ToolSpec};
use crate::infra::runtime::state::AgentState;

pub struct ReadStatusTool {
    state: AgentState,
}

impl ReadStatusTool {
    pub fn new(state: AgentState) -> Self {
        Self { state }
    }
}

/// Always shows at least one decimal (`25.0`, `25.07`).
fn fmt_temp(t: f64) -> String {
    if t.fract() == 0.0 {
        format!("{t:.1}")
    } else {
        format!("{t}")
    }
}

/// Snapshot of the ambient value, lamp power and watched quotes.
pub fn status_text(state: &AgentState) -> String {
    let stocks: Vec<String> = state
        .quotes()
        .iter()
        .map(|q| format!("{}:{}", q.label, q.text))
        .collect();
    let mut out = format!(
        "Temp:{}°C, Lamp:{}, Stocks:[{}]",
        fmt_temp(state.ambient()),
        state.lamp().power,
        stocks.join(", ")
    );
    if let Some(w) = state.weather() {
        out.push_str(&format!(", Weather:{w}"));
    }
    out
}

impl ToolSpec for ReadStatusTool {
    fn name(&self) -> ToolName {
        ToolName::ReadStatus
    }
    fn description(&self) -> &'static str {
        "讀取狀態"
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({"type": "object", "properties": {}})
    }
}

#[async_trait]
impl Tool for ReadStatusTool {
    async fn call(&self, _args: &serde_json::Value) -> Result<String, ToolError> {
        Ok(status_text(&self.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LampState, Power};

    #[tokio::test]
    async fn fresh_state_reports_loading_quotes() {
        let t = ReadStatusTool::new(AgentState::default());
        let out = t.call(&json!({})).await.unwrap();
        assert_eq!(
            out,
            "Temp:25.0°C, Lamp:UNKNOWN, Stocks:[台積電:載入中..., 聯發科:載入中...]"
        );
    }

    #[tokio::test]
    async fn reflects_lamp_quotes_and_weather() {
        let state = AgentState::default();
        state.set_lamp(LampState { power: Power::On, dimmer: 50, ct: 200 });
        state.step_ambient(0.07);
        state.set_quote("2330", "2330: 1010.00".into());
        state.set_weather("台北:24°C".into());
        let out = ReadStatusTool::new(state).call(&json!({})).await.unwrap();
        assert_eq!(
            out,
            "Temp:25.07°C, Lamp:ON, Stocks:[台積電:2330: 1010.00, 聯發科:載入中...], Weather:台北:24°C"
        );
    }
}
