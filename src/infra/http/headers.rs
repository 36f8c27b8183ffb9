use reqwest::RequestBuilder;

/// Add the agent's user agent to an outgoing request. Some public APIs
/// refuse requests without one.
pub fn add_standard_headers(builder: RequestBuilder) -> RequestBuilder {
    builder.header(
        reqwest::header::USER_AGENT,
        format!("lamp-mcp-agent/{}", env!("CARGO_PKG_VERSION")),
    )
}
