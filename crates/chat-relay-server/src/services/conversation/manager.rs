/// manager.rs
use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::Settings;
use crate::logging::{ExchangeLogger, LoggedExchange};
use crate::models::chat::{ChatMessage, ChatRequest, SourceLink};
use crate::models::search::{SearchResult, Snippet};
use crate::services::query_analyzer::{QueryAnalyzer, QueryIntent};
use crate::services::snippet_fetcher::SnippetFetcher;

use super::context_builder::ContextBuilder;
use super::history::{sanitize_history, split_current_turn, HistoryLimits};
use super::memory_query::answer_memory_query;

pub const MODEL_NOT_CONFIGURED_REPLY: &str =
    "I'm up, but my model key isn't configured on the server.";
pub const MODEL_FAILED_REPLY: &str = "Sorry, the model call failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Web,
    News,
}

/// Trait for web/news search
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// `false` when no credential is configured; no lookup is attempted then.
    fn is_configured(&self) -> bool;

    async fn search(&self, kind: SearchKind, query: &str) -> Result<Vec<SearchResult>>;
}

/// Trait for LLM service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// `false` when no credential is configured; no call is attempted then.
    fn is_configured(&self) -> bool;

    async fn generate(&self, messages: &[ChatMessage], params: &GenerationParams) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub history: HistoryLimits,
    pub generation: GenerationParams,
    pub model_timeout: Duration,
    pub max_sources: usize,
}

impl ManagerConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            history: settings.history.into(),
            generation: GenerationParams {
                model: settings.llm.model.clone(),
                temperature: settings.llm.temperature,
                max_tokens: settings.llm.max_tokens,
            },
            model_timeout: settings.llm.call_timeout(),
            max_sources: settings.search.max_sources,
        }
    }
}

/// Which branch produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    MemoryRecall,
    Model,
    ModelNotConfigured,
    ModelFallback,
}

#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub reply: String,
    pub sources: Vec<SourceLink>,
    pub reply_source: ReplySource,
}

/// Runs the `/chat` pipeline for one request.
///
/// Every external failure degrades into a valid reply; nothing here returns
/// an error. The exchange is handed to the logger and never awaited.
pub struct ConversationManager {
    context_builder: ContextBuilder,
    llm_provider: Arc<dyn LlmProvider>,
    snippet_fetcher: SnippetFetcher,
    logger: ExchangeLogger,
    config: ManagerConfig,
}

impl ConversationManager {
    pub fn new(
        llm_provider: Arc<dyn LlmProvider>,
        snippet_fetcher: SnippetFetcher,
        logger: ExchangeLogger,
        context_builder: ContextBuilder,
        config: ManagerConfig,
    ) -> Self {
        Self {
            context_builder,
            llm_provider,
            snippet_fetcher,
            logger,
            config,
        }
    }

    pub async fn handle_message(&self, request: &ChatRequest) -> ChatOutcome {
        let start_time = Instant::now();
        let request_id = Uuid::new_v4();

        let sanitized = sanitize_history(&request.history, self.config.history);
        let prior = split_current_turn(&sanitized, &request.message);

        info!(
            %request_id,
            user_id = %request.user_id,
            message_len = request.message.len(),
            history_raw = ?request.history.as_array().map(Vec::len),
            history_sanitized = prior.len(),
            "Chat request"
        );
        debug!("History tail: {:?}", &prior[prior.len().saturating_sub(3)..]);

        let intent = QueryAnalyzer::analyze_intent(&request.message);

        if intent == QueryIntent::MemoryRecall {
            if let Some(answer) = answer_memory_query(&request.message, prior) {
                info!(%request_id, user_id = %request.user_id, "Answered memory query from history");
                self.record(request, &answer);
                return ChatOutcome {
                    reply: answer,
                    sources: Vec::new(),
                    reply_source: ReplySource::MemoryRecall,
                };
            }
        }

        let fresh = intent == QueryIntent::NeedsFreshInfo;
        let snippets = if fresh && self.snippet_fetcher.is_available() {
            self.snippet_fetcher.fetch(&request.message).await
        } else {
            if fresh {
                debug!("Fresh query but search is not configured, skipping snippets");
            }
            Vec::new()
        };

        let messages = self
            .context_builder
            .build(prior, &request.message, &snippets, fresh);
        debug!(
            messages = messages.len(),
            fresh,
            snippets = snippets.len(),
            "Prompt assembled"
        );

        let (reply, reply_source) = self.generate_reply(&messages).await;

        let sources = snippets
            .iter()
            .take(self.config.max_sources)
            .map(Snippet::source_link)
            .collect();

        self.record(request, &reply);

        info!(
            %request_id,
            user_id = %request.user_id,
            reply_source = ?reply_source,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Chat request completed"
        );

        ChatOutcome {
            reply,
            sources,
            reply_source,
        }
    }

    async fn generate_reply(&self, messages: &[ChatMessage]) -> (String, ReplySource) {
        if !self.llm_provider.is_configured() {
            warn!("Model credential missing, skipping model call");
            return (MODEL_NOT_CONFIGURED_REPLY.to_string(), ReplySource::ModelNotConfigured);
        }

        let call = self
            .llm_provider
            .generate(messages, &self.config.generation);

        match tokio::time::timeout(self.config.model_timeout, call).await {
            Ok(Ok(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    error!("Model returned an empty reply");
                    (MODEL_FAILED_REPLY.to_string(), ReplySource::ModelFallback)
                } else {
                    (text.to_string(), ReplySource::Model)
                }
            }
            Ok(Err(e)) => {
                error!("Model call failed: {:#}", e);
                (MODEL_FAILED_REPLY.to_string(), ReplySource::ModelFallback)
            }
            Err(_) => {
                error!(
                    "Model call timed out after {}ms",
                    self.config.model_timeout.as_millis()
                );
                (MODEL_FAILED_REPLY.to_string(), ReplySource::ModelFallback)
            }
        }
    }

    fn record(&self, request: &ChatRequest, reply: &str) {
        self.logger.log(LoggedExchange::new(
            request.user_id.clone(),
            request.message.clone(),
            reply,
        ));
    }
}
