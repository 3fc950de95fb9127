//! `scribbly gateway` — Start the HTTP API server.

use scribbly_config::AppConfig;

pub async fn run(
    port_override: Option<u16>,
    host_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }
    if let Some(host) = host_override {
        config.gateway.host = host;
    }

    println!("✍️  Scribbly Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    if config.has_api_key() {
        println!("   Provider:  {} ({})", config.provider.base_url, config.provider.model);
    } else {
        println!("   Provider:  disabled, serving heuristic results");
    }

    scribbly_gateway::start(config).await?;

    Ok(())
}
