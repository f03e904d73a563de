use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use chat_relay_server::config::Settings;
use chat_relay_server::database::{DbPool, Repository};
use chat_relay_server::logging::{ConversationStore, ExchangeLogger, MemoryStore};
use chat_relay_server::router::build_router;
use chat_relay_server::services::conversation::{ContextBuilder, ConversationManager, ManagerConfig};
use chat_relay_server::services::{LlmService, SearchService, SnippetFetcher};
use chat_relay_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,chat_relay_server=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("🚀 Starting chat relay server...");

    let settings = Settings::load()?;
    info!("✅ Configuration loaded");

    // Outbound providers
    let llm_service = Arc::new(LlmService::new(&settings.llm)?);
    if settings.llm.api_key.is_none() {
        warn!("GROQ_API_KEY is not set, chat replies will report the missing key");
    }

    let search_service = Arc::new(SearchService::new(&settings.search)?);
    if settings.search.api_key.is_none() {
        warn!("SERPER_API_KEY is not set, web/news augmentation is disabled");
    }

    let snippet_fetcher = SnippetFetcher::new(
        search_service,
        settings.search.fetch_timeout(),
        settings.search.snippet_max_chars,
    );

    // Exchange persistence
    let store = open_store(&settings).await?;
    let logger = ExchangeLogger::new(store, &settings.exchange_log);
    info!("✅ Exchange logger started");

    let context_builder = ContextBuilder::new(
        ContextBuilder::default_base_instruction(),
        settings.search.max_prompt_snippets,
    );

    let conversation_manager = Arc::new(ConversationManager::new(
        llm_service,
        snippet_fetcher,
        logger,
        context_builder,
        ManagerConfig::from_settings(&settings),
    ));

    let state = AppState {
        conversation_manager,
    };

    let app = build_router(state, &settings.server);

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);
    info!("Allowed origins: {:?}", settings.server.allowed_origins);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn open_store(settings: &Settings) -> Result<Arc<dyn ConversationStore>> {
    match settings.database.url.as_deref() {
        Some(url) => {
            let db_pool = DbPool::new(&settings.database, url).await?;
            db_pool
                .run_migrations(&settings.database.migrations_dir)
                .await?;
            info!("✅ Database connection established");
            Ok(Arc::new(Repository::new(db_pool)))
        }
        None => {
            warn!("DATABASE_URL is not set, exchanges are kept in memory only");
            Ok(Arc::new(MemoryStore::new(
                settings.exchange_log.memory_capacity,
            )))
        }
    }
}
