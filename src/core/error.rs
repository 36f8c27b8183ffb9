use thiserror::Error;

/// Agent-wide error model for failures that escape a single tool call.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("config: {0}")]
    Config(String),
    #[error("transport: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("tool registry: {0}")]
    Registry(String),
}

/// Error raised by a tool handler; always rendered to text for the caller.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },
    #[error("{0}")]
    Upstream(String),
}
