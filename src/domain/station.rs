use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Raw name prefix carried by every v2 station.
pub const NAME_PREFIX: &str = "YouBike2.0_";

/// One row of the station directory feed. Other fields are ignored, and
/// missing, null or malformed values read as empty / zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationWire {
    #[serde(default, deserialize_with = "lenient_text")]
    pub sna: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub available_rent_bikes: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub available_return_bikes: u32,
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => s,
        _ => String::new(),
    })
}

/// Counts arrive as numbers, numeric strings or null depending on the row.
fn lenient_count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let n = match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(n.map(|v| v.min(u32::MAX as u64) as u32).unwrap_or(0))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationMatch {
    pub name: String,
    pub bikes: u32,
    pub docks: u32,
}

impl From<StationWire> for StationMatch {
    fn from(w: StationWire) -> Self {
        Self {
            name: display_name(&w.sna),
            bikes: w.available_rent_bikes,
            docks: w.available_return_bikes,
        }
    }
}

pub fn display_name(raw: &str) -> String {
    raw.replace(NAME_PREFIX, "")
}
