use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::clients::quotes::QuoteClient;
use crate::clients::tasmota::TasmotaClient;
use crate::clients::youbike::YouBikeClient;
use crate::core::error::AgentError;
use crate::core::tool::{Tool, ToolName};
use crate::infra::config::Config;
use crate::infra::runtime::state::AgentState;
use crate::tools::led::{ControlLedTool, LedIndicator};
use crate::tools::light::ControlLightTool;
use crate::tools::status::ReadStatusTool;
use crate::tools::stock::SearchStockTool;
use crate::tools::youbike::SearchYoubikeTool;

/// Name → handler table. Built once; every `ToolName` has exactly one
/// handler, so the advertised list and the dispatch table cannot drift.
#[derive(Clone)]
pub struct ToolRegistry {
    by_name: Arc<HashMap<ToolName, Arc<dyn Tool>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

impl ToolRegistry {
    pub fn with_tools<I>(iter: I) -> Result<Self, AgentError>
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let mut map: HashMap<ToolName, Arc<dyn Tool>> = HashMap::new();
        for t in iter {
            let name = t.name();
            if map.insert(name, t).is_some() {
                return Err(AgentError::Registry(format!("duplicate handler for {name}")));
            }
        }
        if let Some(missing) = ToolName::ALL.iter().find(|n| !map.contains_key(*n)) {
            return Err(AgentError::Registry(format!("no handler for {missing}")));
        }
        Ok(Self { by_name: Arc::new(map) })
    }

    /// Descriptors in advertised order.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        ToolName::ALL
            .iter()
            .filter_map(|n| self.by_name.get(n))
            .map(|t| ToolDescriptor {
                name: t.name().as_str(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Dispatch a call. Failures come back as text; this never errors.
    pub async fn call(&self, name: &str, args: &serde_json::Value) -> String {
        let Some(tool) = ToolName::parse(name).and_then(|n| self.by_name.get(&n)) else {
            tracing::warn!(tool = %name, "call for unknown tool");
            return format!("unknown tool: {name}");
        };
        metrics::counter!("tool_calls_total", "tool" => tool.name().as_str()).increment(1);
        match tool.call(args).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "tool call failed");
                e.to_string()
            }
        }
    }
}

/// Wire every tool to its collaborators.
pub fn build_registry(cfg: &Config, state: &AgentState, lamp: TasmotaClient) -> Result<ToolRegistry, AgentError> {
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(ControlLedTool::new(LedIndicator::new(state.clone()))),
        Arc::new(ControlLightTool::new(lamp)),
        Arc::new(ReadStatusTool::new(state.clone())),
        Arc::new(SearchYoubikeTool::new(YouBikeClient::new(cfg.youbike_url.clone()))),
        Arc::new(SearchStockTool::new(QuoteClient::new(cfg.quote_base_url.clone()))),
    ];
    ToolRegistry::with_tools(tools)
}
