//! The assistant orchestrator.
//!
//! Owns one instance of every pipeline component. All shared state (the
//! admission windows and the result cache) is held behind `Arc`s that are
//! passed in at construction, so a gateway can share them across handlers
//! and tests can start from fresh instances.

use scribbly_config::{AdmissionOrder, AppConfig};
use scribbly_core::assistant::{AssistantRequest, AssistantResult};
use scribbly_core::error::{AssistantError, ProviderError};
use scribbly_security::{Admission, AdmissionController, ContentSafetyFilter};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::adapter::ProviderAdapter;
use crate::cache::{Fingerprint, FingerprintCache};
use crate::heuristic::HeuristicFallbackEngine;
use crate::parse::{OutputError, parse_output};
use crate::prompt;
use crate::stats::PipelineStats;

/// Why the provider path produced nothing usable.
///
/// Never reaches the caller: every variant is absorbed by the heuristics.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

pub struct AssistantOrchestrator {
    safety: Arc<ContentSafetyFilter>,
    admission: Arc<AdmissionController>,
    cache: Arc<FingerprintCache>,
    heuristics: HeuristicFallbackEngine,
    provider: Option<ProviderAdapter>,
    admission_order: AdmissionOrder,
    stats: Arc<PipelineStats>,
}

impl AssistantOrchestrator {
    /// An orchestrator with no provider; every call is served by heuristics.
    pub fn new(
        safety: Arc<ContentSafetyFilter>,
        admission: Arc<AdmissionController>,
        cache: Arc<FingerprintCache>,
    ) -> Self {
        Self {
            safety,
            admission,
            cache,
            heuristics: HeuristicFallbackEngine::default(),
            provider: None,
            admission_order: AdmissionOrder::default(),
            stats: Arc::new(PipelineStats::new()),
        }
    }

    /// Build every component from configuration.
    ///
    /// The provider is enabled only when an API key is configured.
    pub fn from_config(config: &AppConfig) -> Self {
        let assistant = &config.assistant;
        let mut orchestrator = Self::new(
            Arc::new(ContentSafetyFilter::new(&assistant.denylist)),
            Arc::new(AdmissionController::new(
                assistant.rate_limit_per_window,
                Duration::from_secs(assistant.rate_window_secs),
            )),
            Arc::new(FingerprintCache::new(Duration::from_secs(
                assistant.cache_ttl_secs,
            ))),
        )
        .with_heuristics(HeuristicFallbackEngine::new(assistant.summary_chars))
        .with_admission_order(assistant.admission_order);

        match scribbly_providers::build_from_config(&config.provider) {
            Some(provider) => {
                orchestrator = orchestrator
                    .with_provider(ProviderAdapter::from_config(provider, &config.provider));
            }
            None => info!("No API key configured, serving heuristic results only"),
        }
        orchestrator
    }

    pub fn with_provider(mut self, provider: ProviderAdapter) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_heuristics(mut self, heuristics: HeuristicFallbackEngine) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn with_admission_order(mut self, order: AdmissionOrder) -> Self {
        self.admission_order = order;
        self
    }

    pub fn with_stats(mut self, stats: Arc<PipelineStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn cache(&self) -> &Arc<FingerprintCache> {
        &self.cache
    }

    pub fn admission(&self) -> &Arc<AdmissionController> {
        &self.admission
    }

    pub fn stats(&self) -> &Arc<PipelineStats> {
        &self.stats
    }

    pub fn provider_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Run one request for `client_id` through the full pipeline.
    ///
    /// Returns `Ok` with status `ok` or `sensitive`; empty input and a full
    /// admission window are the only errors. Provider failures never
    /// surface here.
    pub async fn run(
        &self,
        request: &AssistantRequest,
        client_id: &str,
    ) -> Result<AssistantResult, AssistantError> {
        let request_id = uuid::Uuid::new_v4();
        let span = info_span!(
            "assistant",
            %request_id,
            mode = %request.mode,
            client = %client_id
        );
        self.run_inner(request, client_id).instrument(span).await
    }

    async fn run_inner(
        &self,
        request: &AssistantRequest,
        client_id: &str,
    ) -> Result<AssistantResult, AssistantError> {
        self.stats.record_request();

        let content = request.content.trim();
        if content.is_empty() {
            self.stats.record_empty_input();
            return Err(AssistantError::EmptyInput);
        }

        if self.admission_order == AdmissionOrder::BeforeSafetyCheck {
            self.admit(client_id)?;
        }

        if let Some(violation) = self.safety.check(content) {
            warn!(term = %violation.term, "Input rejected as sensitive");
            self.stats.record_sensitive_input();
            return Ok(AssistantResult::sensitive());
        }

        if self.admission_order == AdmissionOrder::AfterSafetyCheck {
            self.admit(client_id)?;
        }

        let fingerprint = Fingerprint::of(request);
        if let Some(cached) = self.cache.get(&fingerprint) {
            debug!(%fingerprint, "Cache hit");
            self.stats.record_cache_hit();
            self.stats.record_completed();
            return Ok(cached);
        }

        let result = match &self.provider {
            None => self.heuristics.fallback(request),
            Some(adapter) => match self.generate(adapter, request, content).await {
                Ok(result) => result,
                Err(failure) => {
                    warn!(error = %failure, "Provider path failed, using heuristics");
                    if matches!(failure, GenerationFailure::Provider(_)) {
                        self.stats.record_provider_failure();
                    }
                    self.stats.record_fallback();
                    self.heuristics.fallback(request)
                }
            },
        };

        if let Some(violation) = self.safety.check(&result.text_for_screening()) {
            warn!(term = %violation.term, "Output rejected as sensitive");
            self.stats.record_sensitive_output();
            return Ok(AssistantResult::sensitive());
        }

        self.cache.put(fingerprint, result.clone());
        self.stats.record_completed();
        info!("Assistant request completed");
        Ok(result)
    }

    fn admit(&self, client_id: &str) -> Result<(), AssistantError> {
        match self.admission.admit(client_id) {
            Admission::Allowed => Ok(()),
            Admission::Denied { retry_after } => {
                self.stats.record_rate_limited();
                // Round up so a client that waits the advertised time is admitted.
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                Err(AssistantError::RateLimited {
                    retry_after_secs: secs.max(1),
                })
            }
        }
    }

    async fn generate(
        &self,
        adapter: &ProviderAdapter,
        request: &AssistantRequest,
        content: &str,
    ) -> Result<AssistantResult, GenerationFailure> {
        let prompts = prompt::build(request, content);
        self.stats.record_provider_call();
        let raw = adapter.generate(&prompts.system, &prompts.user).await?;
        Ok(parse_output(&raw, request, content)?)
    }
}

impl std::fmt::Debug for AssistantOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantOrchestrator")
            .field("provider", &self.provider)
            .field("admission_order", &self.admission_order)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
