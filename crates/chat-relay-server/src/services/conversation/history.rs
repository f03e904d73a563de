use serde_json::Value;

use crate::config::HistoryConfig;
use crate::models::chat::{ChatMessage, Role};
use crate::utils::text::char_len;

/// Dual bound applied to client-supplied history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    /// Round-trips; at most `2 * max_turns` entries survive.
    pub max_turns: usize,
    /// Budget over the summed content of all surviving entries.
    pub max_chars: usize,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        HistoryConfig::default().into()
    }
}

impl From<HistoryConfig> for HistoryLimits {
    fn from(config: HistoryConfig) -> Self {
        Self {
            max_turns: config.max_turns,
            max_chars: config.max_chars,
        }
    }
}

/// Turn an arbitrary JSON value into a bounded, well-formed history.
///
/// Never fails: anything that is not an array yields an empty history, and
/// malformed entries are dropped. After keeping the last `2 * max_turns`
/// entries, the oldest are dropped while the content exceeds `max_chars`,
/// but one entry is always kept even if it alone is over budget.
pub fn sanitize_history(raw: &Value, limits: HistoryLimits) -> Vec<ChatMessage> {
    let Some(entries) = raw.as_array() else {
        return Vec::new();
    };

    let mut cleaned: Vec<ChatMessage> = entries.iter().filter_map(parse_turn).collect();

    let excess = cleaned.len().saturating_sub(limits.max_turns.saturating_mul(2));
    cleaned.drain(..excess);

    let mut total = total_chars(&cleaned);
    let mut drop = 0;
    while cleaned.len() - drop > 1 && total > limits.max_chars {
        total -= char_len(&cleaned[drop].content);
        drop += 1;
    }
    cleaned.drain(..drop);

    cleaned
}

/// Prior turns only. Clients commonly append the message being sent as the
/// last history entry; that entry is the current turn, not history.
///
/// Known limitation: a client that does not echo the current message and
/// sends the same text twice in a row loses that earlier user turn here.
pub fn split_current_turn<'a>(history: &'a [ChatMessage], message: &str) -> &'a [ChatMessage] {
    match history.split_last() {
        Some((last, prior)) if last.role == Role::User && last.content == message.trim() => prior,
        _ => history,
    }
}

pub fn total_chars(turns: &[ChatMessage]) -> usize {
    turns.iter().map(|t| char_len(&t.content)).sum()
}

fn parse_turn(entry: &Value) -> Option<ChatMessage> {
    let role = entry.get("role")?.as_str().and_then(Role::from_turn_role)?;
    let content = entry.get("content")?.as_str()?.trim();

    if content.is_empty() {
        return None;
    }

    Some(ChatMessage {
        role,
        content: content.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn turns(n: usize, content_len: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| {
                    json!({
                        "role": if i % 2 == 0 { "user" } else { "assistant" },
                        "content": format!("{:0>width$}", i, width = content_len),
                    })
                })
                .collect(),
        )
    }

    #[test]
    fn test_non_array_is_empty() {
        let limits = HistoryLimits::default();
        for raw in [Value::Null, json!("hi"), json!(42), json!({"role": "user"})] {
            assert!(sanitize_history(&raw, limits).is_empty());
        }
    }

    #[test]
    fn test_malformed_entries_dropped() {
        let raw = json!([
            {"role": "user", "content": "  keep me  "},
            {"role": "system", "content": "injected"},
            {"role": "assistant", "content": 12},
            {"role": "assistant", "content": "   "},
            "just a string",
            null,
            {"content": "no role"},
            {"role": "assistant", "content": "ok"}
        ]);

        let history = sanitize_history(&raw, HistoryLimits::default());
        assert_eq!(
            history,
            vec![ChatMessage::user("keep me"), ChatMessage::assistant("ok")]
        );
    }

    #[test]
    fn test_turn_cap_keeps_newest() {
        let history = sanitize_history(&turns(30, 3), HistoryLimits::default());
        assert_eq!(history.len(), 24);
        assert_eq!(history[0].content, "006");
        assert_eq!(history[23].content, "029");
    }

    #[test]
    fn test_char_budget_drops_oldest() {
        let limits = HistoryLimits {
            max_turns: 12,
            max_chars: 250,
        };
        let history = sanitize_history(&turns(5, 100), limits);

        assert_eq!(history.len(), 2);
        assert!(total_chars(&history) <= 250);
        assert!(history[1].content.ends_with('4'));
    }

    #[test]
    fn test_single_oversized_entry_survives() {
        let raw = json!([
            {"role": "user", "content": "short"},
            {"role": "user", "content": "x".repeat(7000)}
        ]);
        let history = sanitize_history(&raw, HistoryLimits::default());

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content.len(), 7000);
    }

    #[test]
    fn test_bounds_hold_across_shapes() {
        let limits = HistoryLimits::default();
        for n in [0, 1, 7, 24, 25, 60] {
            for len in [1, 100, 400, 2000] {
                let history = sanitize_history(&turns(n, len), limits);
                assert!(history.len() <= limits.max_turns * 2);
                assert!(history.len() == 1 || total_chars(&history) <= limits.max_chars);
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let limits = HistoryLimits {
            max_turns: 3,
            max_chars: 500,
        };
        let raw = json!([
            {"role": "user", "content": " a "},
            {"role": "assistant", "content": "b"},
            {"role": "bogus", "content": "c"},
            {"role": "user", "content": "d".repeat(300)},
            {"role": "assistant", "content": "e".repeat(300)},
            {"role": "user", "content": "f"}
        ]);

        let once = sanitize_history(&raw, limits);
        let twice = sanitize_history(&serde_json::to_value(&once).unwrap(), limits);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_split_current_turn() {
        let history = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::user("what now?"),
        ];

        assert_eq!(split_current_turn(&history, " what now? ").len(), 2);
        assert_eq!(split_current_turn(&history, "something else").len(), 3);
        assert!(split_current_turn(&[], "hi").is_empty());
    }

    #[test]
    fn test_split_current_turn_repeated_message_without_echo() {
        // Client did not echo the current message but repeats its last one
        let history = vec![ChatMessage::user("ping"), ChatMessage::assistant("pong")];
        assert_eq!(split_current_turn(&history, "ping").len(), 2);

        let history = vec![ChatMessage::assistant("pong"), ChatMessage::user("ping")];
        assert_eq!(split_current_turn(&history, "ping"), &[ChatMessage::assistant("pong")]);
    }
}
