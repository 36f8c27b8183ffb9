//! Domain model: lamp, indicator, quotes, stations, and text normalization.

pub mod lamp;
pub mod led;
pub mod normalize;
pub mod quote;
pub mod station;

pub use lamp::{LampCommand, LampState, Power};
pub use led::{LedMode, LedState};
pub use normalize::normalize;
pub use station::StationMatch;
