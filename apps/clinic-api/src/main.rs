use anyhow::Result;
use clinic_api::telemetry::init_tracing;
use clinic_api::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;
    init_tracing(config.log_format)?;
    clinic_api::serve(config).await
}
