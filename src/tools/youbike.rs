use async_trait::async_trait;
use serde_json::json;

use crate::clients::youbike::YouBikeClient;
use crate::core::error::ToolError;
use crate::core::tool::{Tool, ToolName, ToolSpec};
use crate::domain::StationMatch;
use crate::tools::args::required_str;

pub const SHOWN_MATCHES: usize = 5;
pub const NOT_FOUND_TEXT: &str = "找不到符合的站點，請嘗試其他關鍵字。";

pub struct SearchYoubikeTool {
    client: YouBikeClient,
}

impl SearchYoubikeTool {
    pub fn new(client: YouBikeClient) -> Self {
        Self { client }
    }
}

/// Numbered summary of the first few matches.
pub fn format_matches(matches: &[StationMatch]) -> String {
    let mut lines = vec![format!("共找到 {} 筆，列出前 {SHOWN_MATCHES} 筆:", matches.len())];
    for (i, m) in matches.iter().take(SHOWN_MATCHES).enumerate() {
        lines.push(format!("{}. {} (🚲借:{} / 🅿️還:{})", i + 1, m.name, m.bikes, m.docks));
    }
    lines.join("\n")
}

impl ToolSpec for SearchYoubikeTool {
    fn name(&self) -> ToolName {
        ToolName::SearchYoubike
    }
    fn description(&self) -> &'static str {
        "查YouBike"
    }
    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {"city": {"type": "string"}, "station": {"type": "string"}},
            "required": ["city", "station"]
        })
    }
}

#[async_trait]
impl Tool for SearchYoubikeTool {
    async fn call(&self, args: &serde_json::Value) -> Result<String, ToolError> {
        let city = required_str(args, "city")?;
        let station = required_str(args, "station")?;
        match self.client.search(city, station).await {
            Ok(matches) if matches.is_empty() => Ok(NOT_FOUND_TEXT.to_string()),
            Ok(matches) => Ok(format_matches(&matches)),
            Err(e) => Ok(format!("查詢錯誤: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn station(name: &str, bikes: u32, docks: u32) -> serde_json::Value {
        json!({"sna": format!("YouBike2.0_{name}"), "available_rent_bikes": bikes, "available_return_bikes": docks})
    }

    #[test]
    fn summary_lists_at_most_five() {
        let matches: Vec<StationMatch> = (1..=7)
            .map(|i| StationMatch { name: format!("站{i}"), bikes: i, docks: 10 - i })
            .collect();
        let text = format_matches(&matches);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + SHOWN_MATCHES);
        assert_eq!(lines[0], "共找到 7 筆，列出前 5 筆:");
        assert_eq!(lines[1], "1. 站1 (🚲借:1 / 🅿️還:9)");
        assert_eq!(lines[5], "5. 站5 (🚲借:5 / 🅿️還:5)");
    }

    #[tokio::test]
    async fn found_not_found_and_error_are_distinct_texts() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/ok");
            then.status(200).json_body(json!([station("公館二號", 4, 8), station("市政府", 1, 1)]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/down");
            then.status(502);
        });

        let ok = SearchYoubikeTool::new(YouBikeClient::new(server.url("/ok")));
        let found = ok.call(&json!({"city":"台北市","station":"公馆"})).await.unwrap();
        assert!(found.starts_with("共找到 1 筆"));
        assert!(found.contains("1. 公館二號 (🚲借:4 / 🅿️還:8)"));

        let none = ok.call(&json!({"city":"台北市","station":"板橋"})).await.unwrap();
        assert_eq!(none, NOT_FOUND_TEXT);

        let down = SearchYoubikeTool::new(YouBikeClient::new(server.url("/down")));
        let err = down.call(&json!({"city":"台北市","station":"公館"})).await.unwrap();
        assert_eq!(err, "查詢錯誤: API Error 502");
    }

    #[tokio::test]
    async fn missing_station_is_rejected_before_fetching() {
        let t = SearchYoubikeTool::new(YouBikeClient::new("http://127.0.0.1:9/none"));
        let err = t.call(&json!({"city":"台北市"})).await.unwrap_err();
        assert_eq!(err.to_string(), "missing required field: station");
    }
}
