//! JSON-RPC wire shapes spoken with the MCP gateway.

use serde::{Deserialize, Serialize};
use serde_json::Value as J;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Deserialize, Debug)]
pub struct RpcReq {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// Absent on notifications. An explicit `"id": null` also reads as
    /// `None`, so such a request is treated as a notification.
    #[serde(default)]
    pub id: Option<J>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: J,
}

#[derive(Serialize, Debug, Clone)]
pub struct RpcResp {
    pub jsonrpc: &'static str,
    pub id: J,
    pub result: J,
}

/// Every reply this agent sends is a success; tool failures travel as text.
pub fn ok(id: J, result: J) -> RpcResp {
    RpcResp { jsonrpc: "2.0", id, result }
}

/// Protocol methods this agent answers. Anything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    Ping,
    ToolsList,
    ToolsCall,
}

impl Method {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "initialize" => Some(Method::Initialize),
            "ping" => Some(Method::Ping),
            "tools/list" => Some(Method::ToolsList),
            "tools/call" => Some(Method::ToolsCall),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: J,
    pub server_info: ServerInfo,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl InitializeResult {
    pub fn new(server_info: ServerInfo) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: serde_json::json!({ "tools": { "listChanged": true } }),
            server_info,
        }
    }
}
