use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEV_FRONTEND_ORIGIN: &str = "http://localhost:5173";
const PROD_FRONTEND_ORIGIN: &str = "https://real-time-rag-chatbot.netlify.app";

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub history: HistoryConfig,
    pub database: DatabaseConfig,
    pub exchange_log: ExchangeLogConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means "derive from FRONTEND_URL / NODE_ENV".
    pub allowed_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: Vec::new(),
            body_limit_bytes: 2 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    /// Deadline for the whole model call, enforced by the orchestrator.
    pub call_timeout_ms: u64,
    /// Transport timeout of the HTTP client itself.
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.1,
            max_tokens: 900,
            call_timeout_ms: 15_000,
            timeout_seconds: 20,
        }
    }
}

impl LlmConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Deadline for the joined web + news lookup.
    pub fetch_timeout_ms: u64,
    pub timeout_seconds: u64,
    pub snippet_max_chars: usize,
    pub max_prompt_snippets: usize,
    pub max_sources: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://google.serper.dev".to_string(),
            api_key: None,
            fetch_timeout_ms: 8_000,
            timeout_seconds: 15,
            snippet_max_chars: 300,
            max_prompt_snippets: 6,
            max_sources: 4,
        }
    }
}

impl SearchConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Round-trips kept; the turn cap is twice this.
    pub max_turns: usize,
    pub max_chars: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_turns: 12,
            max_chars: 6000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    /// No URL means exchanges are kept in memory only.
    pub url: Option<String>,
    pub pool_max_size: u32,
    pub pool_timeout_seconds: u64,
    pub migrations_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_max_size: 5,
            pool_timeout_seconds: 5,
            migrations_dir: "migrations".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ExchangeLogConfig {
    pub queue_capacity: usize,
    pub worker_count: usize,
    /// Cap for the in-memory store used when no database is configured.
    pub memory_capacity: usize,
}

impl Default for ExchangeLogConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1_000,
            worker_count: 1,
            memory_capacity: 10_000,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .try_parsing(true),
            )
            // Plain deployment variables win over everything else
            .set_override_option("server.port", legacy_env("PORT"))?
            .set_override_option("llm.api_key", legacy_env("GROQ_API_KEY"))?
            .set_override_option("search.api_key", legacy_env("SERPER_API_KEY"))?
            .set_override_option("database.url", legacy_env("DATABASE_URL"))?
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;

        if settings.server.allowed_origins.is_empty() {
            let production = legacy_env("NODE_ENV").as_deref() == Some("production");
            settings.server.allowed_origins =
                vec![default_origin(production, legacy_env("FRONTEND_URL"))];
        }

        Ok(settings)
    }
}

fn legacy_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_origin(production: bool, frontend_url: Option<String>) -> String {
    if production {
        frontend_url.unwrap_or_else(|| PROD_FRONTEND_ORIGIN.to_string())
    } else {
        DEV_FRONTEND_ORIGIN.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.history.max_turns, 12);
        assert_eq!(settings.history.max_chars, 6000);
        assert_eq!(settings.llm.call_timeout(), Duration::from_secs(15));
        assert_eq!(settings.search.fetch_timeout(), Duration::from_secs(8));
        assert!(settings.llm.api_key.is_none());
        assert!(settings.search.api_key.is_none());
    }

    #[test]
    fn test_default_origin() {
        assert_eq!(default_origin(false, Some("https://x.dev".into())), DEV_FRONTEND_ORIGIN);
        assert_eq!(default_origin(true, None), PROD_FRONTEND_ORIGIN);
        assert_eq!(default_origin(true, Some("https://x.dev".into())), "https://x.dev");
    }

    #[test]
    fn test_blank_legacy_env_is_unset() {
        std::env::set_var("CHAT_RELAY_TEST_BLANK_URL", "");
        std::env::set_var("CHAT_RELAY_TEST_SPACES_URL", "   ");
        std::env::set_var("CHAT_RELAY_TEST_SET_URL", "postgres://db/chat");

        assert_eq!(legacy_env("CHAT_RELAY_TEST_BLANK_URL"), None);
        assert_eq!(legacy_env("CHAT_RELAY_TEST_SPACES_URL"), None);
        assert_eq!(
            legacy_env("CHAT_RELAY_TEST_SET_URL").as_deref(),
            Some("postgres://db/chat")
        );
        assert_eq!(legacy_env("CHAT_RELAY_TEST_NEVER_SET"), None);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = Config::builder()
            .set_override("llm.model", "small-model")
            .unwrap()
            .set_override("history.max_turns", 3)
            .unwrap()
            .build()
            .unwrap();

        let settings: Settings = config.try_deserialize().unwrap();
        assert_eq!(settings.llm.model, "small-model");
        assert_eq!(settings.llm.max_tokens, 900);
        assert_eq!(settings.history.max_turns, 3);
        assert_eq!(settings.history.max_chars, 6000);
    }
}
