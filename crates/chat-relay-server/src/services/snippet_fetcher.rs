use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::search::Snippet;
use crate::services::conversation::manager::{SearchKind, SearchProvider};

/// Runs the web and news lookups concurrently under one deadline.
///
/// Augmentation is optional: a failed lookup on either side, or the deadline
/// elapsing, yields no snippets at all rather than an error.
pub struct SnippetFetcher {
    provider: Arc<dyn SearchProvider>,
    timeout: Duration,
    snippet_max_chars: usize,
}

impl SnippetFetcher {
    pub fn new(provider: Arc<dyn SearchProvider>, timeout: Duration, snippet_max_chars: usize) -> Self {
        Self {
            provider,
            timeout,
            snippet_max_chars,
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_configured()
    }

    /// Web results first, then news.
    pub async fn fetch(&self, query: &str) -> Vec<Snippet> {
        let lookups = futures::future::try_join(
            self.provider.search(SearchKind::Web, query),
            self.provider.search(SearchKind::News, query),
        );

        match tokio::time::timeout(self.timeout, lookups).await {
            Ok(Ok((web, news))) => {
                debug!("Search returned {} web + {} news results", web.len(), news.len());
                web.iter()
                    .chain(news.iter())
                    .map(|r| Snippet::from_result(r, self.snippet_max_chars))
                    .collect()
            }
            Ok(Err(e)) => {
                warn!("Search skipped: {:#}", e);
                Vec::new()
            }
            Err(_) => {
                warn!("Search skipped: timeout after {}ms", self.timeout.as_millis());
                Vec::new()
            }
        }
    }
}
