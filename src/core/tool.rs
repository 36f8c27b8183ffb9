use async_trait::async_trait;

use crate::core::error::ToolError;

/// The closed set of tools this agent advertises. Listing order is the
/// order of `ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ControlLed,
    ControlLight,
    ReadStatus,
    SearchYoubike,
    SearchStock,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::ControlLed,
        ToolName::ControlLight,
        ToolName::ReadStatus,
        ToolName::SearchYoubike,
        ToolName::SearchStock,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::ControlLed => "control_led",
            ToolName::ControlLight => "control_light",
            ToolName::ReadStatus => "read_status",
            ToolName::SearchYoubike => "search_youbike",
            ToolName::SearchStock => "search_stock",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal metadata every tool must expose.
pub trait ToolSpec {
    fn name(&self) -> ToolName;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> serde_json::Value;
}

/// Tool = Spec + handler. Handlers answer in plain text only.
#[async_trait]
pub trait Tool: ToolSpec + Send + Sync {
    async fn call(&self, arguments: &serde_json::Value) -> Result<String, ToolError>;
}
