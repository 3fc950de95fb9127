//! `scribbly ask` — Run one request through the assistant pipeline.

use scribbly_assistant::AssistantOrchestrator;
use scribbly_config::AppConfig;
use scribbly_core::assistant::AssistantRequest;

pub async fn run(request: AssistantRequest, client: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let orchestrator = AssistantOrchestrator::from_config(&config);

    let result = orchestrator.run(&request, client).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
