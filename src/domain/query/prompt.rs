//! Retrieval-augmented prompt assembly

use crate::domain::vector_index::ScoredPassage;

const INSTRUCTION: &str = "You are an expert AI assistant with access to relevant knowledge. \
Based on the following retrieved context, provide a well-structured, clear, and engaging \
response to the user's query. Keep the response concise but complete, delivering only the \
necessary information without unnecessary elaboration. If the context is insufficient, \
respond thoughtfully based on your general knowledge.";

const NO_CONTEXT: &str = "No relevant passages were found in the indexed documents.";

/// Build the generation prompt for `query` from the retrieved passages
///
/// Passages are numbered from 1 in retrieval order and tagged with their
/// source and one-based page number.
pub fn build_prompt(query: &str, passages: &[ScoredPassage]) -> String {
    let mut prompt = String::with_capacity(
        INSTRUCTION.len() + query.len() + passages.iter().map(|p| p.text.len() + 64).sum::<usize>(),
    );

    prompt.push_str(INSTRUCTION);
    prompt.push_str(&format!(
        "\n\nUser Query: {}\n\nRetrieved Context:\n",
        query.trim()
    ));

    if passages.is_empty() {
        prompt.push_str(NO_CONTEXT);
        prompt.push('\n');
    }

    for (i, passage) in passages.iter().enumerate() {
        prompt.push_str(&format!(
            "[{}] (source: {}, page {})\n{}\n\n",
            i + 1,
            passage.metadata.source_id,
            passage.metadata.page_index + 1,
            passage.text.trim_end()
        ));
    }

    prompt.push_str("\nAI Response:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingestion::ChunkMetadata;

    fn passage(text: &str, source: &str, page: usize) -> ScoredPassage {
        ScoredPassage::new("id", text, ChunkMetadata::new(source, page, 0), 0.8)
    }

    #[test]
    fn test_prompt_numbers_and_tags_passages() {
        let prompt = build_prompt(
            "  What is the refund policy? ",
            &[
                passage("Refunds within 30 days.", "policy.pdf", 0),
                passage("Contact support.", "faq.docx", 2),
            ],
        );

        assert!(prompt.starts_with("You are an expert AI assistant"));
        assert!(prompt.contains("User Query: What is the refund policy?\n"));
        assert!(prompt.contains("[1] (source: policy.pdf, page 1)\nRefunds within 30 days."));
        assert!(prompt.contains("[2] (source: faq.docx, page 3)\nContact support."));
        assert!(prompt.contains("Refunds within 30 days.\n\n[2]"));
        assert!(prompt.contains("Retrieved Context:\n[1]"));
        assert!(prompt.contains("general knowledge"));
        assert!(prompt.ends_with("AI Response:"));
        assert!(!prompt.contains(NO_CONTEXT));
    }

    #[test]
    fn test_prompt_without_passages() {
        let prompt = build_prompt("hello", &[]);

        assert!(prompt.contains(NO_CONTEXT));
        assert!(!prompt.contains("[1]"));
        assert!(prompt.contains(&format!("Retrieved Context:\n{}\n\nAI Response:", NO_CONTEXT)));
    }
}
