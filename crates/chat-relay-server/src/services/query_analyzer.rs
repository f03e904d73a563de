/// Query Analyzer
/// Cheap keyword heuristics that route a message before any external call:
/// "what did I say before" questions and questions that likely need live data.
/// Memory questions are a substring test over a fixed phrase table; freshness
/// is a case-insensitive keyword regex.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Phrases that ask the assistant to recall the user's previous message.
const MEMORY_QUERY_PATTERNS: &[&str] = &[
    "do you remember",
    "remember my last message",
    "what was my last message",
    "what did i say before",
];

/// Recency keywords. Matched anywhere in the text, so "know" hits "now".
static FRESHNESS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(latest|today|now|news|update|price|rate|this week|this month|current|who is|new|recent)",
    )
    .expect("freshness pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    /// Asks what the user said earlier; answered without the model
    MemoryRecall,

    /// Likely needs up-to-date information; web/news snippets help
    NeedsFreshInfo,

    /// Everything else
    General,
}

pub struct QueryAnalyzer;

impl QueryAnalyzer {
    pub fn analyze_intent(query: &str) -> QueryIntent {
        if Self::is_memory_query(query) {
            QueryIntent::MemoryRecall
        } else if Self::needs_fresh_info(query) {
            QueryIntent::NeedsFreshInfo
        } else {
            QueryIntent::General
        }
    }

    pub fn is_memory_query(query: &str) -> bool {
        let query_lower = query.to_lowercase();

        for pattern in MEMORY_QUERY_PATTERNS {
            if query_lower.contains(pattern) {
                debug!("Detected MemoryRecall intent: matched '{}'", pattern);
                return true;
            }
        }

        false
    }

    pub fn needs_fresh_info(query: &str) -> bool {
        match FRESHNESS_PATTERN.find(query) {
            Some(m) => {
                debug!("Detected freshness keyword '{}'", m.as_str());
                true
            }
            None => false,
        }
    }
}
