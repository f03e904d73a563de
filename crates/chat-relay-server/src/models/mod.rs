pub mod chat;
pub mod search;

pub use chat::{ChatMessage, ChatRequest, ChatResponse, Role, SourceLink};
pub use search::{SearchResult, Snippet};
