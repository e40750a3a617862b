//! Draft generator: produce a candidate answer from retrieved evidence
//!
//! The draft must be grounded strictly in the supplied evidence; the
//! verifier depends on that contract when it checks claims. Side-effect
//! free beyond the returned string.

use std::sync::Arc;
use tracing::debug;

use crate::documents::types::Document;
use crate::errors::{DocChatError, Result};
use crate::llm::LanguageModel;

/// Drafts answers grounded in retrieved evidence
pub struct ResearchAgent {
    model: Arc<dyn LanguageModel>,
}

impl ResearchAgent {
    /// Create an agent over a language-model capability
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Generate a draft answer from the question and its evidence set
    pub async fn generate(&self, question: &str, evidence: &[Document]) -> Result<String> {
        let prompt = build_prompt(question, evidence);
        let draft = self
            .model
            .complete(&prompt)
            .await
            .map_err(|e| DocChatError::Stage {
                stage: "research".to_string(),
                reason: e.to_string(),
            })?;

        debug!(question, draft_len = draft.len(), "draft generated");
        Ok(draft.trim().to_string())
    }
}

fn build_prompt(question: &str, evidence: &[Document]) -> String {
    let mut prompt = String::from(
        "Answer the question using only the excerpts below. Do not add \
         facts, figures, or citations that are not present in the excerpts. \
         If an excerpt gives a partial answer, say what is known and what is not.\n\n",
    );
    prompt.push_str(&format!("Question: {}\n\nExcerpts:\n", question));
    for (idx, doc) in evidence.iter().enumerate() {
        let source = if doc.metadata.source.is_empty() {
            String::new()
        } else {
            match doc.metadata.page {
                Some(page) => format!(" ({} p.{})", doc.metadata.source, page),
                None => format!(" ({})", doc.metadata.source),
            }
        };
        prompt.push_str(&format!("[{}]{} {}\n", idx + 1, source, doc.content));
    }
    prompt.push_str("\nAnswer:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::types::DocumentMetadata;
    use async_trait::async_trait;

    struct EchoModel;

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            Ok(format!("  echo:{}  ", prompt.len()))
        }
    }

    #[tokio::test]
    async fn test_generate_trims_output() {
        let agent = ResearchAgent::new(Arc::new(EchoModel));
        let draft = agent.generate("q?", &[]).await.unwrap();
        assert!(!draft.starts_with(' '));
        assert!(!draft.ends_with(' '));
    }

    #[test]
    fn test_prompt_cites_source_and_page() {
        let evidence = vec![Document::new(
            "The Eiffel Tower is 330m tall.",
            DocumentMetadata {
                source: "landmarks.pdf".to_string(),
                page: Some(7),
                embedding: None,
            },
        )];
        let prompt = build_prompt("How tall is the Eiffel Tower?", &evidence);
        assert!(prompt.contains("landmarks.pdf p.7"));
        assert!(prompt.contains("330m"));
        assert!(prompt.contains("only the excerpts"));
    }
}
