//! Best-effort exchange persistence with an async queue in front of the store

mod logger;
pub mod store;
pub mod types;

pub use logger::ExchangeLogger;
pub use store::{ConversationStore, MemoryStore};
pub use types::{LoggedExchange, StoredExchange};
