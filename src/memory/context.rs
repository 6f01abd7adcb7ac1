//! Render search results as prompt context for the chat model.

use crate::memory::types::UnifiedMemoryResult;

pub const CONTEXT_HEADER: &str = "[Relevant context from memory:]";
pub const QUESTION_MARKER: &str = "[User Question]:";

/// One block listing every result as `SOURCE: snippet`, or `None` when there are no results.
pub fn build_memory_context(result: &UnifiedMemoryResult, snippet_chars: usize) -> Option<String> {
    if result.results.is_empty() {
        return None;
    }

    let mut parts = vec![CONTEXT_HEADER.to_string()];
    for r in &result.results {
        parts.push(format!(
            "\n{}: {}",
            r.source.as_str().to_uppercase(),
            truncate_chars(&r.content, snippet_chars)
        ));
    }
    Some(parts.join("\n"))
}

/// Prepend memory context to the user's message. Returns the message unchanged if
/// nothing was found.
pub fn enrich_prompt(message: &str, result: &UnifiedMemoryResult, snippet_chars: usize) -> String {
    match build_memory_context(result, snippet_chars) {
        Some(context) => format!("{context}\n\n{QUESTION_MARKER} {message}"),
        None => message.to_string(),
    }
}

fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}
