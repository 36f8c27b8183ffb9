pub mod args;
pub mod led;
pub mod light;
pub mod registry;
pub mod status;
pub mod stock;
pub mod youbike;
