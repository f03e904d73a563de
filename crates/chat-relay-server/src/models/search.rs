use serde::{Deserialize, Serialize};

use super::chat::SourceLink;
use crate::utils::text::{collapse_whitespace, truncate_chars};

pub const UNTITLED: &str = "Untitled";
pub const NO_LINK: &str = "N/A";

/// One raw item from the search provider; every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// A search result reduced to what the prompt and the sources list need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

impl Snippet {
    pub fn from_result(result: &SearchResult, max_chars: usize) -> Self {
        let title = result
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| result.link.as_deref().filter(|l| !l.is_empty()))
            .unwrap_or(UNTITLED)
            .trim()
            .to_string();

        let collapsed = collapse_whitespace(result.snippet.as_deref().unwrap_or_default());
        let snippet = truncate_chars(&collapsed, max_chars).to_string();

        let link = result
            .link
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(NO_LINK)
            .to_string();

        Self {
            title,
            snippet,
            link,
        }
    }

    pub fn source_link(&self) -> SourceLink {
        SourceLink {
            title: self.title.clone(),
            link: self.link.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_for_missing_fields() {
        let snippet = Snippet::from_result(&SearchResult::default(), 300);
        assert_eq!(snippet.title, UNTITLED);
        assert_eq!(snippet.snippet, "");
        assert_eq!(snippet.link, NO_LINK);
    }

    #[test]
    fn test_title_falls_back_to_link() {
        let snippet = Snippet::from_result(
            &SearchResult {
                title: None,
                snippet: Some("x".to_string()),
                link: Some("https://example.com/a".to_string()),
            },
            300,
        );
        assert_eq!(snippet.title, "https://example.com/a");
    }

    #[test]
    fn test_snippet_collapsed_and_capped() {
        let long = format!("{}\n\n{}", "a".repeat(200), "b".repeat(200));
        let snippet = Snippet::from_result(
            &SearchResult {
                title: Some("  Title  ".to_string()),
                snippet: Some(long),
                link: None,
            },
            300,
        );
        assert_eq!(snippet.title, "Title");
        assert_eq!(snippet.snippet.chars().count(), 300);
        assert!(!snippet.snippet.contains('\n'));
        assert_eq!(&snippet.snippet[200..201], " ");
    }
}
