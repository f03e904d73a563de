//! Conversation pipeline for the chat endpoint
//!
//! - History sanitizing (turn cap + character budget)
//! - Deterministic answers to "do you remember…" questions
//! - Prompt assembly around optional web/news snippets
//! - Orchestration with timeouts and fallback replies

mod context_builder;
pub mod history;
pub mod manager;
pub mod memory_query;

pub use context_builder::{ContextBuilder, NO_SNIPPETS_SENTINEL, VERIFY_CAVEAT};
pub use history::{sanitize_history, split_current_turn, HistoryLimits};
pub use manager::{
    ChatOutcome, ConversationManager, GenerationParams, LlmProvider, ManagerConfig, ReplySource,
    SearchKind, SearchProvider, MODEL_FAILED_REPLY, MODEL_NOT_CONFIGURED_REPLY,
};
pub use memory_query::{answer_memory_query, NO_EARLIER_MESSAGE_REPLY};
