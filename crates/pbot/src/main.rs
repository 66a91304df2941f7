use std::sync::Arc;

use pbot_core::{config::Config, ports::GenerationPort};
use pbot_openrouter::OpenRouterClient;

#[tokio::main]
async fn main() -> Result<(), pbot_core::Error> {
    pbot_core::logging::init("pbot")?;

    let cfg = Arc::new(Config::load()?);

    let generator: Arc<dyn GenerationPort> = Arc::new(
        OpenRouterClient::from_config(&cfg)
            .map_err(|e| pbot_core::Error::Config(format!("generation client: {e}")))?,
    );

    tracing::info!("bot running");
    pbot_telegram::router::run_polling(cfg, generator)
        .await
        .map_err(|e| pbot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
