//! Core types & traits: protocol shapes, tool contracts, error model.

pub mod content;
pub mod error;
pub mod mcp;
pub mod tool;
