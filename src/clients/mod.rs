pub mod quotes;
pub mod tasmota;
pub mod weather;
pub mod youbike;
