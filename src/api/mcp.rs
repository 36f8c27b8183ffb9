//! JSON-RPC session handler: one inbound text frame in, at most one reply out.

use serde_json::{json, Value as J};

use crate::core::content::CallToolResult;
use crate::core::mcp::{ok as rpc_ok, InitializeResult, Method, RpcReq, RpcResp, ServerInfo};
use crate::tools::registry::ToolRegistry;

#[derive(Clone)]
pub struct SessionHandler {
    registry: ToolRegistry,
    server_info: ServerInfo,
}

fn tools_list(reg: &ToolRegistry) -> J {
    json!({ "tools": reg.list() })
}

async fn call_tool(reg: &ToolRegistry, params: &J) -> String {
    let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
        return "missing tool name".into();
    };
    let empty = json!({});
    let args = match params.get("arguments") {
        Some(a) if !a.is_null() => a,
        _ => &empty,
    };
    reg.call(name, args).await
}

impl SessionHandler {
    pub fn new(registry: ToolRegistry, server_info: ServerInfo) -> Self {
        Self { registry, server_info }
    }

    /// Interpret one frame. Returns the reply to send, if any.
    ///
    /// Malformed JSON and unknown methods are dropped. Messages without an
    /// `id` get no reply, except `ping`, which is always answered.
    pub async fn handle(&self, raw: &str) -> Option<RpcResp> {
        let req: RpcReq = match serde_json::from_str(raw) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "dropping unparseable frame");
                return None;
            }
        };
        let method_name = req.method.as_deref().unwrap_or_default();
        let Some(method) = Method::parse(method_name) else {
            tracing::debug!(method = %method_name, id = ?req.id, "ignoring unknown method");
            return None;
        };

        let result = match method {
            Method::Initialize => serde_json::to_value(InitializeResult::new(self.server_info.clone()))
                .unwrap_or(J::Null),
            Method::Ping => json!({}),
            Method::ToolsList => {
                tracing::info!("tools listed");
                tools_list(&self.registry)
            }
            Method::ToolsCall => {
                let text = call_tool(&self.registry, &req.params).await;
                CallToolResult::text(text).into_json()
            }
        };

        match (req.id, method) {
            (Some(id), _) => Some(rpc_ok(id, result)),
            (None, Method::Ping) => Some(rpc_ok(J::Null, result)),
            (None, _) => None,
        }
    }

    /// `handle`, serialized for the wire.
    pub async fn handle_text(&self, raw: &str) -> Option<String> {
        let resp = self.handle(raw).await?;
        match serde_json::to_string(&resp) {
            Ok(s) => Some(s),
            Err(e) => {
                tracing::error!(error = %e, "reply serialization failed");
                None
            }
        }
    }
}
