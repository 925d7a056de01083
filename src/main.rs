use std::sync::Arc;

use stopover_agent::services::Orchestrator;
use stopover_agent::AgentConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stopover_agent=info".into()),
        )
        .init();

    let config = AgentConfig::from_env()?;
    let orchestrator = Arc::new(Orchestrator::from_config(config)?);

    let addr = std::env::var("STOPOVER_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3005".into());
    stopover_agent::server::serve(orchestrator, &addr).await
}
