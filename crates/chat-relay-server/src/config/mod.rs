pub mod settings;

pub use settings::{
    DatabaseConfig, ExchangeLogConfig, HistoryConfig, LlmConfig, SearchConfig, ServerConfig,
    Settings,
};
