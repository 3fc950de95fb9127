//! Provider construction from configuration.

use crate::openai_compat::OpenAiCompatProvider;
use crate::retry::RetryingProvider;
use scribbly_config::ProviderConfig;
use scribbly_core::provider::Provider;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Build the configured provider, wrapped in its timeout/retry policy.
///
/// Returns `None` when no API key is configured: the pipeline then runs on
/// heuristics alone.
pub fn build_from_config(config: &ProviderConfig) -> Option<Arc<dyn Provider>> {
    let api_key = config.api_key.as_deref().filter(|k| !k.trim().is_empty())?;
    let timeout = Duration::from_secs(config.timeout_secs);

    let inner = OpenAiCompatProvider::new(provider_name(&config.base_url), &config.base_url, api_key)
        .with_timeout(timeout);

    info!(
        provider = %inner.name(),
        model = %config.model,
        timeout_secs = config.timeout_secs,
        max_retries = config.max_retries,
        "Text-generation provider enabled"
    );

    Some(Arc::new(
        RetryingProvider::new(Arc::new(inner))
            .with_timeout(timeout)
            .with_max_retries(config.max_retries),
    ))
}

/// Derive a short provider name from well-known base URLs.
fn provider_name(base_url: &str) -> &'static str {
    let lower = base_url.to_ascii_lowercase();
    if lower.contains("openrouter.ai") {
        "openrouter"
    } else if lower.contains("api.openai.com") {
        "openai"
    } else if lower.contains("deepseek.com") {
        "deepseek"
    } else if lower.contains("localhost:11434") {
        "ollama"
    } else {
        "openai-compat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_key_means_no_provider() {
        let config = ProviderConfig::default();
        assert!(build_from_config(&config).is_none());
    }

    #[test]
    fn blank_key_means_no_provider() {
        let config = ProviderConfig {
            api_key: Some("   ".into()),
            ..ProviderConfig::default()
        };
        assert!(build_from_config(&config).is_none());
    }

    #[test]
    fn key_enables_provider() {
        let config = ProviderConfig {
            api_key: Some("sk-or-test".into()),
            ..ProviderConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openrouter");
    }

    #[test]
    fn provider_names_from_urls() {
        assert_eq!(provider_name("https://openrouter.ai/api/v1"), "openrouter");
        assert_eq!(provider_name("https://api.openai.com/v1"), "openai");
        assert_eq!(provider_name("https://api.deepseek.com/v1"), "deepseek");
        assert_eq!(provider_name("http://localhost:11434/v1"), "ollama");
        assert_eq!(provider_name("http://10.0.0.5:8000/v1"), "openai-compat");
    }
}
