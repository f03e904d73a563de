use anyhow::Result;
use tracing::debug;

use super::DbPool;
use crate::logging::{ConversationStore, LoggedExchange};

pub struct Repository {
    pub pool: DbPool,
}

impl Repository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Append one exchange; `created_at` is assigned by postgres.
    pub async fn insert_exchange(&self, exchange: &LoggedExchange) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO chat_messages (user_id, role, content, reply, created_at)
               VALUES ($1, $2, $3, $4, NOW())
               RETURNING id"#,
        )
        .bind(&exchange.user_id)
        .bind(exchange.role.as_str())
        .bind(&exchange.content)
        .bind(&exchange.reply)
        .fetch_one(self.pool.get_pool())
        .await?;

        debug!("Stored exchange {} for user {}", id, exchange.user_id);
        Ok(id)
    }
}

#[async_trait::async_trait]
impl ConversationStore for Repository {
    async fn record(&self, exchange: &LoggedExchange) -> Result<()> {
        self.insert_exchange(exchange).await.map(|_| ())
    }
}
