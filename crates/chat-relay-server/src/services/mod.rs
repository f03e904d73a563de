pub mod conversation;
pub mod llm_service;
pub mod query_analyzer;
pub mod search_service;
pub mod snippet_fetcher;

pub use conversation::ConversationManager;
pub use llm_service::LlmService;
pub use query_analyzer::{QueryAnalyzer, QueryIntent};
pub use search_service::SearchService;
pub use snippet_fetcher::SnippetFetcher;
