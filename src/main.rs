use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    lamp_mcp_agent::infra::logging::init();
    lamp_mcp_agent::cli::run().await
}
