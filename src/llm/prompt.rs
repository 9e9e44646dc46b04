//! Prompt assembly
//!
//! Builds the single string forwarded to the chat session. Context is passed
//! through whole; nothing here truncates or budgets tokens.

/// Combine a user query with optional document context.
///
/// Without context (or with an empty one) the query is returned verbatim.
pub fn assemble(query: &str, context: Option<&str>) -> String {
    match context {
        Some(context) if !context.is_empty() => format!(
            "DOCUMENT CONTEXT (use this to answer the user's question): \n---\n\
             {context}\n---\n\n\
             USER QUESTION (answer based ONLY on the context if possible, otherwise use general knowledge): {query}"
        ),
        _ => query.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_context_is_verbatim() {
        assert_eq!(assemble("2+2?", None), "2+2?");
        assert_eq!(assemble("  spaced query  ", None), "  spaced query  ");
    }

    #[test]
    fn test_empty_context_is_treated_as_absent() {
        assert_eq!(assemble("What is osmosis?", Some("")), "What is osmosis?");
    }

    #[test]
    fn test_context_precedes_query() {
        let context = "The scholarship covers three courses.";
        let query = "How many courses are covered?";
        let prompt = assemble(query, Some(context));

        let context_at = prompt.find(context).expect("context embedded");
        let query_at = prompt.rfind(query).expect("query embedded");
        assert!(context_at < query_at);
        assert!(prompt.starts_with("DOCUMENT CONTEXT"));
        assert!(prompt.ends_with(query));
    }

    #[test]
    fn test_template_layout() {
        let prompt = assemble("Q", Some("C"));
        assert_eq!(
            prompt,
            "DOCUMENT CONTEXT (use this to answer the user's question): \n---\nC\n---\n\n\
             USER QUESTION (answer based ONLY on the context if possible, otherwise use general knowledge): Q"
        );
    }

    #[test]
    fn test_large_context_is_not_truncated() {
        let context = "lorem ipsum ".repeat(50_000);
        let prompt = assemble("summarize", Some(&context));
        assert!(prompt.contains(&context));
    }
}
