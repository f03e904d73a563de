use crate::models::chat::ChatMessage;
use crate::models::search::Snippet;

pub const SNIPPETS_HEADER: &str = "Web/news snippets (optional):";
pub const NO_SNIPPETS_SENTINEL: &str = "No web/news snippets for this question.";
pub const VERIFY_CAVEAT: &str = "If the snippets don't confirm the answer, say you can't verify it.";

/// Assembles the prompt sent to the model.
///
/// Order is fixed: instruction, snippets message, history, current message.
/// The instruction has to come before any conversational content, and the
/// snippets message is emitted even when empty so its position never moves.
pub struct ContextBuilder {
    base_instruction: String,
    max_snippets: usize,
}

impl ContextBuilder {
    pub fn new(base_instruction: String, max_snippets: usize) -> Self {
        Self {
            base_instruction,
            max_snippets,
        }
    }

    #[cfg(test)]
    fn base_instruction(&self) -> &str {
        &self.base_instruction
    }

    pub fn default_base_instruction() -> String {
        "You are a precise assistant. Answer concisely and factually. \
         Prefer the provided web/news snippets over prior knowledge for recent information; \
         otherwise be explicit about uncertainty. \
         Never invent sources, links or citations."
            .to_string()
    }

    pub fn build(
        &self,
        history: &[ChatMessage],
        message: &str,
        snippets: &[Snippet],
        fresh: bool,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 3);

        messages.push(ChatMessage::system(self.base_instruction.clone()));
        messages.push(ChatMessage::system(self.snippets_message(snippets)));
        messages.extend_from_slice(history);

        let content = if fresh {
            format!("{}\n\n{}", message, VERIFY_CAVEAT)
        } else {
            message.to_string()
        };
        messages.push(ChatMessage::user(content));

        messages
    }

    pub fn snippets_message(&self, snippets: &[Snippet]) -> String {
        if snippets.is_empty() || self.max_snippets == 0 {
            return NO_SNIPPETS_SENTINEL.to_string();
        }

        let mut lines = vec![SNIPPETS_HEADER.to_string(), String::new()];
        lines.extend(
            snippets
                .iter()
                .take(self.max_snippets)
                .enumerate()
                .map(|(i, s)| format!("- ({}) {}\n{}\nLink: {}", i + 1, s.title, s.snippet, s.link)),
        );

        lines.join("\n")
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(Self::default_base_instruction(), 6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    fn snippet(i: usize) -> Snippet {
        Snippet {
            title: format!("Title {i}"),
            snippet: format!("Body {i}"),
            link: format!("https://site{i}.dev"),
        }
    }

    #[test]
    fn test_layout_without_snippets() {
        let builder = ContextBuilder::default();
        let history = vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")];

        let messages = builder.build(&history, "how are you?", &[], false);

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, builder.base_instruction());
        assert_eq!(messages[1], ChatMessage::system(NO_SNIPPETS_SENTINEL));
        assert_eq!(&messages[2..4], &history[..]);
        assert_eq!(messages[4], ChatMessage::user("how are you?"));
    }

    #[test]
    fn test_exactly_two_leading_system_messages() {
        let builder = ContextBuilder::default();
        let snippets: Vec<Snippet> = (0..3).map(snippet).collect();

        for s in [&snippets[..0], &snippets[..]] {
            let messages = builder.build(&[], "q", s, false);
            let system_count = messages.iter().filter(|m| m.role == Role::System).count();
            assert_eq!(system_count, 2);
            assert_eq!(messages[0].role, Role::System);
            assert_eq!(messages[1].role, Role::System);
        }
    }

    #[test]
    fn test_snippet_digest_capped() {
        let builder = ContextBuilder::default();
        let snippets: Vec<Snippet> = (0..9).map(snippet).collect();

        let digest = builder.snippets_message(&snippets);

        assert!(digest.starts_with("Web/news snippets (optional):\n\n- (1) Title 0\nBody 0\nLink: https://site0.dev"));
        assert!(digest.contains("- (6) Title 5"));
        assert!(!digest.contains("(7)"));
    }

    #[test]
    fn test_caveat_only_when_fresh() {
        let builder = ContextBuilder::default();

        let fresh = builder.build(&[], "latest news?", &[], true);
        assert_eq!(
            fresh.last().unwrap().content,
            format!("latest news?\n\n{}", VERIFY_CAVEAT)
        );

        let plain = builder.build(&[], "explain traits", &[], false);
        assert_eq!(plain.last().unwrap().content, "explain traits");
    }
}
