/// Simulated RGB indicator display mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedMode {
    Off,
    Static(String),
    Rainbow,
}

pub const LED_DARK: &str = "#000000";

/// Colours the rainbow effect cycles through, one step per tick.
pub const RAINBOW: [&str; 6] = ["#FF0000", "#FFFF00", "#00FF00", "#00FFFF", "#0000FF", "#FF00FF"];

/// Indicator state: the mode and the colour currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedState {
    pub mode: LedMode,
    pub color: String,
}

impl Default for LedState {
    fn default() -> Self {
        Self { mode: LedMode::Off, color: LED_DARK.to_string() }
    }
}

pub fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}
