use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::chat::Role;

/// One request/reply pair as persisted by the conversation store.
///
/// `created_at` is not part of the record: the store assigns it on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggedExchange {
    pub user_id: String,
    pub role: Role,
    pub content: String,
    pub reply: String,
}

impl LoggedExchange {
    pub fn new(user_id: impl Into<String>, content: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: Role::User,
            content: content.into(),
            reply: reply.into(),
        }
    }
}

/// A stored exchange together with its store-assigned timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct StoredExchange {
    #[serde(flatten)]
    pub exchange: LoggedExchange,
    pub created_at: DateTime<Utc>,
}
