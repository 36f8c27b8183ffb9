use async_trait::async_trait;
use serde_json::json;

use crate::clients::quotes::QuoteClient;
use crate::core::error::ToolError;
use crate::core::tool::{Tool, ToolName, ToolSpec};
use crate::domain::quote::format_quote;
use crate::tools::args::required_str;

pub struct SearchStockTool {
    quotes: QuoteClient,
}

impl SearchStockTool {
    pub fn new(quotes: QuoteClient) -> Self {
        Self { quotes }
    }
}

impl ToolSpec for SearchStockTool {
    fn name(&self) -> ToolName {
        ToolName::SearchStock
    }
    fn description(&self) -> &'static str {
        "查詢股價"
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {"stock_id": {"type": "string"}},
            "required": ["stock_id"]
        })
    }
}

#[async_trait]
impl Tool for SearchStockTool {
    async fn call(&self, args: &serde_json::Value) -> Result<String, ToolError> {
        let sid = required_str(args, "stock_id")?;
        Ok(match self.quotes.fetch(sid).await {
            Some(q) => format_quote(&q),
            None => format!("查無 {sid}"),
        })
    }
}
