//! Tasmota lamp command vocabulary and the mirrored device state.

use std::fmt;

use serde::Deserialize;

pub const BRIGHTNESS_MAX: u8 = 100;
pub const CT_WARMEST: u16 = 153;
pub const CT_COOLEST: u16 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Power {
    On,
    Off,
    #[default]
    Unknown,
}

impl Power {
    pub fn from_device(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "ON" => Power::On,
            "OFF" => Power::Off,
            _ => Power::Unknown,
        }
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Power::On => "ON",
            Power::Off => "OFF",
            Power::Unknown => "UNKNOWN",
        })
    }
}

/// Last observed lamp state. `ct` is 153 (warm) to 500 (cool).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LampState {
    pub power: Power,
    pub dimmer: u8,
    pub ct: u16,
}

impl Default for LampState {
    fn default() -> Self {
        Self { power: Power::Unknown, dimmer: 0, ct: CT_WARMEST }
    }
}

/// Body of the device's `State` reply; only the fields the mirror tracks.
#[derive(Debug, Deserialize)]
pub struct DeviceStatus {
    #[serde(rename = "POWER", default)]
    pub power: Option<String>,
    #[serde(rename = "Dimmer", default)]
    pub dimmer: Option<u8>,
    #[serde(rename = "CT", default)]
    pub ct: Option<u16>,
}

impl From<DeviceStatus> for LampState {
    fn from(s: DeviceStatus) -> Self {
        Self {
            power: Power::from_device(s.power.as_deref().unwrap_or("OFF")),
            dimmer: s.dimmer.unwrap_or(0),
            ct: s.ct.unwrap_or(CT_WARMEST),
        }
    }
}

/// One device directive, rendered as the `cmnd` query value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LampCommand {
    PowerToggle,
    PowerOn,
    PowerOff,
    Dimmer(u8),
    Ct(u16),
    Color(String),
    State,
    Backlog(Vec<LampCommand>),
}

impl LampCommand {
    /// Unconditional off: power, brightness and colour all reset.
    pub fn shutdown() -> Self {
        LampCommand::Backlog(vec![
            LampCommand::PowerOff,
            LampCommand::Dimmer(0),
            LampCommand::Color("0".into()),
        ])
    }

    /// Power on, then brightness, then colour temperature, in one request.
    pub fn power_on_with(brightness: Option<u8>, ct: Option<u16>) -> Self {
        let mut cmds = vec![LampCommand::PowerOn];
        if let Some(b) = brightness {
            cmds.push(LampCommand::Dimmer(b));
        }
        if let Some(c) = ct {
            cmds.push(LampCommand::Ct(c));
        }
        LampCommand::Backlog(cmds)
    }
}

impl fmt::Display for LampCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LampCommand::PowerToggle => f.write_str("Power TOGGLE"),
            LampCommand::PowerOn => f.write_str("Power On"),
            LampCommand::PowerOff => f.write_str("Power Off"),
            LampCommand::Dimmer(v) => write!(f, "Dimmer {v}"),
            LampCommand::Ct(v) => write!(f, "CT {v}"),
            LampCommand::Color(v) => write!(f, "Color {v}"),
            LampCommand::State => f.write_str("State"),
            LampCommand::Backlog(cmds) => {
                let joined: Vec<String> = cmds.iter().map(|c| c.to_string()).collect();
                write!(f, "Backlog {}", joined.join(";"))
            }
        }
    }
}
