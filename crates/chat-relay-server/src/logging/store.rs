use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::VecDeque;

use super::types::{LoggedExchange, StoredExchange};

/// Append-only sink for exchanges. Callers never see its outcome; see
/// [`super::ExchangeLogger`].
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    async fn record(&self, exchange: &LoggedExchange) -> Result<()>;
}

/// Bounded in-process store, used when no database is configured.
/// The oldest exchange is evicted once `capacity` is reached.
pub struct MemoryStore {
    capacity: usize,
    entries: Mutex<VecDeque<StoredExchange>>,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<StoredExchange> {
        self.entries.lock().iter().cloned().collect()
    }
}

#[async_trait::async_trait]
impl ConversationStore for MemoryStore {
    async fn record(&self, exchange: &LoggedExchange) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(StoredExchange {
            exchange: exchange.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }
}
