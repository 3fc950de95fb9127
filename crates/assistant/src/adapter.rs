//! Provider adapter: the one call the pipeline makes to the outside world.
//!
//! Timeouts and transport retries belong to the wrapped provider (see
//! `scribbly_providers::RetryingProvider`); the adapter only shapes the
//! request and hands back raw text.

use scribbly_config::ProviderConfig;
use scribbly_core::error::ProviderError;
use scribbly_core::message::Message;
use scribbly_core::provider::{Provider, ProviderRequest};
use std::sync::Arc;
use tracing::debug;

/// Sends a system/user prompt pair to a provider in JSON mode.
#[derive(Clone)]
pub struct ProviderAdapter {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ProviderAdapter {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    /// Adapter using the model and sampling settings from `config`.
    pub fn from_config(provider: Arc<dyn Provider>, config: &ProviderConfig) -> Self {
        Self::new(provider, &config.model)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one generation and return the raw reply text.
    pub async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::system(system_prompt), Message::user(user_prompt)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            json_mode: true,
        };

        let response = self.provider.complete(request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                provider = %self.provider.name(),
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Provider reply received"
            );
        }

        Ok(response.message.content)
    }
}

impl std::fmt::Debug for ProviderAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderAdapter")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scribbly_core::message::Role;
    use scribbly_core::provider::ProviderResponse;
    use std::sync::Mutex;

    /// Records the last request and echoes a fixed reply.
    struct RecordingProvider {
        last: Mutex<Option<ProviderRequest>>,
    }

    #[async_trait]
    impl Provider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            *self.last.lock().unwrap() = Some(request.clone());
            Ok(ProviderResponse {
                message: Message::assistant(r#"{"summary":"ok"}"#),
                usage: None,
                model: request.model,
            })
        }
    }

    #[tokio::test]
    async fn generate_sends_json_mode_prompt_pair() {
        let provider = Arc::new(RecordingProvider {
            last: Mutex::new(None),
        });
        let adapter = ProviderAdapter::from_config(provider.clone(), &ProviderConfig::default());

        let raw = adapter.generate("contract", "post").await.unwrap();
        assert_eq!(raw, r#"{"summary":"ok"}"#);

        let sent = provider.last.lock().unwrap().clone().unwrap();
        assert!(sent.json_mode);
        assert_eq!(sent.model, "deepseek/deepseek-v3");
        assert_eq!(sent.max_tokens, Some(800));
        assert_eq!(sent.messages[0].role, Role::System);
        assert_eq!(sent.messages[0].content, "contract");
        assert_eq!(sent.messages[1].role, Role::User);
    }
}
