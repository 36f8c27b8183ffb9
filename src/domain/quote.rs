/// Fixed symbols shown by `read_status`, with their display labels.
pub const WATCHLIST: [(&str, &str); 2] = [("2330", "台積電"), ("2454", "聯發科")];

pub const QUOTE_LOADING: &str = "載入中...";
pub const QUOTE_FAILED: &str = "讀取失敗";

/// Last daily bar for a symbol. Volume is in lots of 1000 shares.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume_lots: u64,
}

pub fn format_quote(q: &Quote) -> String {
    format!(
        "{}: {:.2} (開:{:.2} 高:{:.2} 低:{:.2} 量:{}張)",
        q.symbol, q.price, q.open, q.high, q.low, q.volume_lots
    )
}

/// Exchange-qualified symbol; bare numeric codes are Taiwan listings.
pub fn qualify_symbol(symbol: &str) -> String {
    if !symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_digit()) {
        format!("{symbol}.TW")
    } else {
        symbol.to_string()
    }
}
