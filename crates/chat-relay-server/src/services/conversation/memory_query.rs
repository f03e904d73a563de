use crate::models::chat::{ChatMessage, Role};
use crate::services::query_analyzer::QueryAnalyzer;

pub const NO_EARLIER_MESSAGE_REPLY: &str =
    "You haven't sent any message before this one in this chat.";

/// Answer "do you remember…" questions straight from history.
///
/// `prior` is the history without the message just sent. The answer quotes
/// the second-most-recent user turn of the conversation, counting the
/// current message as the most recent one. Returns `None` when the message
/// is not a memory query, so the caller continues to the model.
pub fn answer_memory_query(message: &str, prior: &[ChatMessage]) -> Option<String> {
    if !QueryAnalyzer::is_memory_query(message) {
        return None;
    }

    let mut user_turns: Vec<&str> = prior
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .collect();
    user_turns.push(message);

    let reply = match user_turns.len().checked_sub(2).map(|i| user_turns[i]) {
        Some(previous) => format!("Yes, your previous message in this chat was:\n\n“{}”", previous),
        None => NO_EARLIER_MESSAGE_REPLY.to_string(),
    };

    Some(reply)
}
