use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::error::{ApiError, MISSING_FIELDS_MESSAGE};

// ===== CONVERSATION MODELS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Roles a client may send as history. `system` is reserved for the server.
    pub fn from_turn_role(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// One role-tagged message, used both for history turns and prompt entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// ===== REQUEST MODELS =====

/// Validated `/chat` request.
///
/// Two body shapes are accepted:
/// - `{ message, userId, history? }`
/// - `{ messages: [...], userId }`, where the last `user` entry is the message
///   and the whole array is the history.
///
/// `history` stays an untyped JSON value; the history sanitizer decides what
/// survives.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
    pub history: Value,
}

impl ChatRequest {
    pub fn from_body(body: &Value) -> Result<Self, ApiError> {
        let mut message = non_empty_str(body.get("message"));
        let mut history = body.get("history").cloned().unwrap_or(Value::Null);

        if message.is_none() {
            if let Some(Value::Array(messages)) = body.get("messages") {
                message = messages
                    .iter()
                    .rev()
                    .find(|m| m.get("role").and_then(Value::as_str) == Some("user"))
                    .and_then(|m| non_empty_str(m.get("content")));
                history = Value::Array(messages.clone());
            }
        }

        let user_id = non_empty_str(body.get("userId"));

        match (message, user_id) {
            (Some(message), Some(user_id)) => Ok(Self {
                user_id,
                message,
                history,
            }),
            _ => Err(ApiError::BadRequest(MISSING_FIELDS_MESSAGE.to_string())),
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub sources: Vec<SourceLink>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_shape() {
        let req = ChatRequest::from_body(&json!({
            "message": "hi",
            "userId": "u1",
            "history": [{"role": "user", "content": "hi"}]
        }))
        .unwrap();

        assert_eq!(req.message, "hi");
        assert_eq!(req.user_id, "u1");
        assert!(req.history.is_array());
    }

    #[test]
    fn test_messages_shape_uses_last_user_entry() {
        let req = ChatRequest::from_body(&json!({
            "userId": "u1",
            "messages": [
                {"role": "user", "content": "first"},
                {"role": "assistant", "content": "reply"},
                {"role": "user", "content": "second"},
                {"role": "assistant", "content": "trailing"}
            ]
        }))
        .unwrap();

        assert_eq!(req.message, "second");
        assert_eq!(req.history.as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn test_missing_fields_rejected() {
        for body in [
            json!({"message": "hi"}),
            json!({"userId": "u1"}),
            json!({"message": "", "userId": "u1"}),
            json!({"messages": [{"role": "assistant", "content": "x"}], "userId": "u1"}),
            json!([1, 2, 3]),
            Value::Null,
        ] {
            match ChatRequest::from_body(&body) {
                Err(ApiError::BadRequest(msg)) => assert_eq!(msg, MISSING_FIELDS_MESSAGE),
                other => panic!("expected bad request for {body}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let msg = ChatMessage::assistant("ok");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"role": "assistant", "content": "ok"})
        );
        assert_eq!(Role::from_turn_role("system"), None);
    }
}
