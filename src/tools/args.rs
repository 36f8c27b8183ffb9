//! Argument extraction shared by the tool handlers.

use serde_json::Value;

use crate::core::error::ToolError;

pub fn required_str<'a>(args: &'a Value, field: &'static str) -> Result<&'a str, ToolError> {
    args.get(field)
        .and_then(|v| v.as_str())
        .ok_or(ToolError::MissingField(field))
}

pub fn optional_str<'a>(args: &'a Value, field: &'static str) -> Option<&'a str> {
    args.get(field).and_then(|v| v.as_str())
}

/// Optional integer within `min..=max`. Integral floats (`80.0`) and
/// numeric strings are accepted since callers are language models.
pub fn optional_int(args: &Value, field: &'static str, min: i64, max: i64) -> Result<Option<i64>, ToolError> {
    let v = match args.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };
    let n = match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    let n = n.ok_or_else(|| ToolError::InvalidArgument { field, reason: "must be an integer".into() })?;
    if !(min..=max).contains(&n) {
        return Err(ToolError::InvalidArgument { field, reason: format!("must be between {min} and {max}") });
    }
    Ok(Some(n))
}
