//! Response Pipeline (C5): the top-level orchestration tying context
//! checking, compression, translation, polling, and retry together.

use crate::compact_strategy::get_strategy;
use crate::compressor;
use crate::config::AdapterConfig;
use crate::context_monitor::ContextMonitor;
use crate::context_monitor::ContextStats;
use crate::error::classify_sdk_error;
use crate::error::AdapterError;
use crate::error::Result;
use crate::message::ContentBlock;
use crate::message::Message;
use crate::message::ProviderResponse;
use crate::message::StopReason;
use crate::message::StreamEvent;
use crate::message::ToolSpec;
use crate::message::Usage;
use crate::model_profile;
use crate::model_profile::ModelProfile;
use crate::retry::OnRetryAttempt;
use crate::retry::RetryPolicy;
use crate::translator;
use regex::Regex;
use responses_sdk::Client;
use responses_sdk::ReasoningConfig;
use responses_sdk::ResponseCreateParams;
use responses_sdk::ResponseStatus;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The `isGeneratingSummary` guard, redesigned as a tagged state machine
/// (spec §9) rather than a bare `bool`. Behavior at the I4 boundary is
/// unchanged: `Compressing` only while a compression-producing call is
/// in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactionState {
    Idle,
    Compressing,
}

/// RAII guard that restores [`CompactionState::Idle`] on every exit path
/// — success, error, or panic unwind — generalizing the same pattern a
/// per-request scoped context uses to avoid five different hand-written
/// cleanup points. Holds an owned handle rather than a borrow of the
/// pipeline so the guarded call can still take `&mut Pipeline`.
struct CompactionGuard {
    state: Rc<Cell<CompactionState>>,
}

impl CompactionGuard {
    fn enter(state: Rc<Cell<CompactionState>>) -> Self {
        state.set(CompactionState::Compressing);
        Self { state }
    }
}

impl Drop for CompactionGuard {
    fn drop(&mut self) {
        self.state.set(CompactionState::Idle);
    }
}

/// The adapter's instance-scoped mutable state plus injected config.
pub struct Pipeline {
    client: Client,
    config: AdapterConfig,
    model: String,
    enable_stateful_chaining: bool,
    auto_compact_enabled: bool,
    last_response_id: Option<String>,
    compaction_state: Rc<Cell<CompactionState>>,
    context_monitor: ContextMonitor,
    retry_policy: RetryPolicy,
    garbled_patterns: Vec<Regex>,
}

impl Pipeline {
    pub fn new(config: AdapterConfig) -> Self {
        let base_url = config.base_url.clone();
        let mut client = Client::new(config.api_key.clone());
        if let Some(base_url) = base_url {
            client = client.with_base_url(base_url);
        }
        let profile = model_profile::lookup(&config.model);
        let garbled_patterns = config
            .garbled_patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    tracing::warn!(pattern, error = %err, "ignoring invalid garbled-output pattern");
                    None
                }
            })
            .collect();

        Self {
            model: config.model.clone(),
            enable_stateful_chaining: config.enable_stateful_chaining,
            auto_compact_enabled: config.auto_compact_enabled,
            last_response_id: None,
            compaction_state: Rc::new(Cell::new(CompactionState::Idle)),
            context_monitor: ContextMonitor::new(profile.context_window),
            retry_policy: RetryPolicy::default(),
            garbled_patterns,
            client,
            config,
        }
    }

    fn check_configured(&self) -> Result<()> {
        if self.config.api_key.trim().is_empty() {
            return Err(AdapterError::Configuration {
                message: "no API key configured".to_string(),
            });
        }
        Ok(())
    }

    fn profile(&self) -> ModelProfile {
        model_profile::lookup(&self.model)
    }

    // ---- Host-facing API (spec §6) ----

    pub fn get_model(&self) -> (&str, ModelProfile) {
        (&self.model, self.profile())
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
        self.context_monitor.set_context_window(self.profile().context_window);
    }

    pub fn reset_stateful_chaining(&mut self) {
        self.last_response_id = None;
    }

    pub fn set_auto_compact(&mut self, enabled: bool) {
        self.auto_compact_enabled = enabled;
    }

    pub fn get_context_stats(&self, messages: &[Message]) -> ContextStats {
        self.context_monitor.stats(messages)
    }

    pub async fn manual_compact(&mut self, messages: Vec<Message>) -> Result<Vec<Message>> {
        let guard = CompactionGuard::enter(Rc::clone(&self.compaction_state));
        let outcome = self.compress(&messages).await;
        drop(guard);
        let outcome = outcome?;
        self.last_response_id = None;
        Ok(outcome.messages)
    }

    /// `createMessage`: the retried, streaming-shaped outer entrypoint.
    /// Per spec §4.5, the whole operation (including any nested
    /// compression call) is re-entered from attempt zero on a retryable
    /// failure. `max_tokens`/`temperature` override the adapter's
    /// construction-time config for this call only (spec §4.5's
    /// `createMessage(system, messages, tools?, maxTokens?, temperature?)`).
    pub async fn create_message(
        &mut self,
        system: Option<String>,
        messages: Vec<Message>,
        tools: Option<Vec<ToolSpec>>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<Vec<StreamEvent>> {
        self.create_message_with_callback(system, messages, tools, max_tokens, temperature, None)
            .await
    }

    pub async fn create_message_with_callback(
        &mut self,
        system: Option<String>,
        messages: Vec<Message>,
        tools: Option<Vec<ToolSpec>>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        on_retry: Option<&OnRetryAttempt<'_>>,
    ) -> Result<Vec<StreamEvent>> {
        self.check_configured()?;

        let policy = self.retry_policy;
        let response = crate::retry::with_retry(&policy, on_retry, || {
            self.create_message_once(system.as_deref(), messages.clone(), tools.clone(), max_tokens, temperature)
        })
        .await?;

        let mut events: Vec<StreamEvent> = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(StreamEvent::Text { text }),
                _ => None,
            })
            .collect();
        if let Some(usage) = response.usage {
            events.push(StreamEvent::Usage(usage));
        }
        Ok(events)
    }

    /// One attempt through the full pipeline (spec §4.5 steps 1-13),
    /// with the outer garbled-output scan applied to the result.
    async fn create_message_once(
        &mut self,
        system: Option<&str>,
        mut messages: Vec<Message>,
        tools: Option<Vec<ToolSpec>>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<ProviderResponse> {
        // 1. Context check.
        let profile = self.profile();
        self.context_monitor.set_context_window(profile.context_window);
        let stats = self.context_monitor.stats(&messages);
        tracing::debug!(
            zone = ?stats.zone,
            percentage = stats.percentage,
            remaining = stats.remaining,
            "context check"
        );

        // 2. Compression branch.
        if self.auto_compact_enabled
            && stats.should_compress
            && self.compaction_state.get() == CompactionState::Idle
        {
            let guard = CompactionGuard::enter(Rc::clone(&self.compaction_state));
            let outcome = self.compress(&messages).await;
            drop(guard);
            let outcome = outcome?;
            tracing::info!(
                tokens_saved = outcome.stats.tokens_saved,
                messages_before = outcome.stats.messages_before,
                messages_after = outcome.stats.messages_after,
                "compression complete"
            );
            messages = outcome.messages;
            self.last_response_id = None;
        }

        // 3. Translate outbound.
        let input = translator::translate_outbound(&messages);

        // 4. Build request.
        let mut params = ResponseCreateParams::new(self.model.clone(), input);
        params.instructions = system.map(str::to_string);
        params.max_output_tokens =
            max_tokens.or(self.config.max_output_tokens).or(Some(profile.max_output_tokens));
        params.temperature = Some(temperature.unwrap_or(self.config.temperature));
        if self.enable_stateful_chaining {
            params.previous_response_id = self.last_response_id.clone();
        }
        if profile.is_reasoning {
            params.reasoning = Some(ReasoningConfig { effort: "high".to_string() });
        }
        if let Some(tools) = &tools {
            params.tools = Some(tools.iter().map(ToolSpec::to_wire).collect());
        }

        // 5-7. POST, error handling, chain recording.
        tracing::debug!(model = %self.model, "posting to responses API");
        let mut response = match self.client.responses().create(params).await {
            Ok(response) => response,
            Err(err) => return Err(self.handle_sdk_error(err)),
        };
        if self.enable_stateful_chaining && !response.id.is_empty() {
            self.last_response_id = Some(response.id.clone());
        }

        // 8. Poll loop.
        while response.status.is_in_flight() {
            tracing::trace!(id = %response.id, status = ?response.status, "polling");
            tokio::time::sleep(POLL_INTERVAL).await;
            response = match self.client.responses().retrieve(&response.id).await {
                Ok(response) => response,
                Err(err) => return Err(self.handle_sdk_error(err)),
            };
        }

        // 9. Terminal status check. `cancelled` is treated identically to
        // `failed` (spec §9 Open Question (b)).
        if matches!(response.status, ResponseStatus::Failed | ResponseStatus::Cancelled) {
            self.last_response_id = None;
            let message = response
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "response reached a terminal failure status with no error detail".to_string());
            return Err(AdapterError::Terminal { message });
        }

        // 10. Structural validation.
        if response.output.is_empty() {
            let chain_was_active = self.last_response_id.is_some();
            self.last_response_id = None;
            return Err(AdapterError::Protocol {
                chain_was_active,
                message: "response completed with an empty output array".to_string(),
            });
        }

        // 11. Translate inbound.
        let (content, stop_reason) = translator::translate_inbound(&response.output);

        // 12. Emptiness check.
        if translator::is_empty_content(&content) {
            let chain_was_active = self.last_response_id.is_some();
            self.last_response_id = None;
            let message = if chain_was_active {
                "the model returned empty content; the conversation chain has been reset, retry the turn".to_string()
            } else {
                "the model returned empty content with no chain to reset; consider a different model".to_string()
            };
            return Err(AdapterError::Protocol { chain_was_active, message });
        }

        // 13. Garbled-output scan (spec §7 row 6), applied after
        // translation so the scan sees what the host would actually see.
        if let Some(pattern) = self.scan_garbled(&content) {
            let chain_was_active = self.last_response_id.is_some();
            self.last_response_id = None;
            return Err(AdapterError::Garbled { chain_was_active, matched_pattern: pattern });
        }

        let usage = response.usage.map(Usage::from);
        Ok(ProviderResponse { content, stop_reason, usage })
    }

    fn handle_sdk_error(&mut self, err: responses_sdk::SdkError) -> AdapterError {
        let adapter_err = classify_sdk_error(&err);
        if matches!(adapter_err, AdapterError::ContextOverflow { .. }) {
            self.last_response_id = None;
        }
        adapter_err
    }

    fn scan_garbled(&self, content: &[ContentBlock]) -> Option<String> {
        for block in content {
            if let ContentBlock::Text { text } = block {
                for pattern in &self.garbled_patterns {
                    if pattern.is_match(text) {
                        return Some(pattern.as_str().to_string());
                    }
                }
            }
        }
        None
    }

    /// Compressor orchestration (C3): invokes this same pipeline
    /// recursively with tools disabled and the guard already set, so the
    /// recursive call's own compression branch (step 2) is a no-op.
    async fn compress(&mut self, messages: &[Message]) -> Result<compressor::CompressionOutcome> {
        let strategy_name = self.config.compact_strategy.clone();
        let _ = get_strategy(&strategy_name); // validates the strategy name up front
        let request_messages = compressor::build_summary_request(&strategy_name, messages);

        let response = self.create_message_once(None, request_messages, None, None, None).await?;
        let summary_text = compressor::extract_summary_text(&response.content);

        Ok(compressor::finish_compression(
            &strategy_name,
            messages,
            summary_text,
            chrono::Utc::now(),
        ))
    }
}
