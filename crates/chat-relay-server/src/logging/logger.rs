use flume::{bounded, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::store::ConversationStore;
use super::types::LoggedExchange;
use crate::config::ExchangeLogConfig;

/// Fire-and-forget writer in front of a [`ConversationStore`].
///
/// `log` only enqueues; background workers perform the write and swallow any
/// failure, so neither the latency nor the outcome of the store ever reaches
/// the HTTP response.
#[derive(Clone)]
pub struct ExchangeLogger {
    sender: Sender<LoggedExchange>,
}

impl ExchangeLogger {
    /// Spawns the workers; must be called inside a Tokio runtime.
    pub fn new(store: Arc<dyn ConversationStore>, config: &ExchangeLogConfig) -> Self {
        let (sender, receiver) = bounded(config.queue_capacity.max(1));
        let worker_count = config.worker_count.max(1);

        info!(
            "Initializing ExchangeLogger: queue={}, workers={}",
            config.queue_capacity, worker_count
        );

        for worker_id in 0..worker_count {
            let store = store.clone();
            let receiver = receiver.clone();

            tokio::spawn(async move {
                Self::worker_loop(worker_id, store, receiver).await;
            });
        }

        Self { sender }
    }

    /// Enqueue an exchange. A full or closed queue drops it with a warning.
    pub fn log(&self, exchange: LoggedExchange) {
        if let Err(e) = self.sender.try_send(exchange) {
            warn!("Dropped exchange log entry: {}", e);
        }
    }

    #[cfg(test)]
    fn queue_len(&self) -> usize {
        self.sender.len()
    }

    async fn worker_loop(
        worker_id: usize,
        store: Arc<dyn ConversationStore>,
        receiver: Receiver<LoggedExchange>,
    ) {
        debug!("Exchange log worker {} started", worker_id);

        while let Ok(exchange) = receiver.recv_async().await {
            if let Err(e) = store.record(&exchange).await {
                warn!(
                    user_id = %exchange.user_id,
                    "Exchange log worker {} failed to persist exchange: {:#}",
                    worker_id,
                    e
                );
            }
        }

        debug!("Exchange log worker {} shutting down (channel closed)", worker_id);
    }
}
