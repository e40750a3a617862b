//! Relevance gate: can the retrieved evidence answer the question at all?
//!
//! Runs before any generation work. The classifier sees only the question
//! and the top-k retrieved chunks; it keeps no memory of prior questions.

use std::sync::Arc;
use tracing::debug;

use crate::documents::types::Document;
use crate::errors::{DocChatError, Result};
use crate::index::hybrid::Retriever;
use crate::llm::LanguageModel;

/// Gate classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    /// The evidence fully supports an answer
    CanAnswer,
    /// The evidence partially supports an answer
    Partial,
    /// Evidence exists but does not cover the question
    NoData,
    /// The question is about something else entirely
    OffTopic,
}

impl Relevance {
    /// Whether the pipeline should proceed to drafting
    ///
    /// `NoData` and `OffTopic` are kept distinct for testability but map
    /// to the same irrelevant edge in the controller.
    pub fn proceed(&self) -> bool {
        matches!(self, Relevance::CanAnswer | Relevance::Partial)
    }

    /// Parse a classifier output, scanning for the known labels
    ///
    /// Anything unrecognized conservatively maps to `NoData` so a
    /// misbehaving classifier never unlocks generation by accident.
    pub fn parse(output: &str) -> Self {
        let upper = output.to_uppercase();
        if upper.contains("CAN_ANSWER") {
            Relevance::CanAnswer
        } else if upper.contains("PARTIAL") {
            Relevance::Partial
        } else if upper.contains("OFF_TOPIC") {
            Relevance::OffTopic
        } else {
            Relevance::NoData
        }
    }
}

/// Classifies whether retrieved evidence can answer a question
pub struct RelevanceChecker {
    model: Arc<dyn LanguageModel>,
}

impl RelevanceChecker {
    /// Create a checker over a language-model capability
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Retrieve top-k evidence and classify answerability
    pub async fn check(
        &self,
        question: &str,
        retriever: &dyn Retriever,
        k: usize,
    ) -> Result<Relevance> {
        let evidence = retriever.query(question, k).await?;

        if evidence.is_empty() {
            debug!(question, "no evidence retrieved, gate returns NoData");
            return Ok(Relevance::NoData);
        }

        let prompt = build_prompt(question, &evidence);
        let output = self
            .model
            .complete(&prompt)
            .await
            .map_err(|e| DocChatError::Stage {
                stage: "check_relevance".to_string(),
                reason: e.to_string(),
            })?;

        let classification = Relevance::parse(&output);
        debug!(question, ?classification, "relevance gate decision");
        Ok(classification)
    }
}

fn build_prompt(question: &str, evidence: &[Document]) -> String {
    let mut prompt = String::from(
        "You are a strict relevance classifier. Based only on the excerpts \
         below, decide whether the question can be answered from them.\n\
         Reply with exactly one label: CAN_ANSWER, PARTIAL, NO_DATA, or OFF_TOPIC.\n\n",
    );
    prompt.push_str(&format!("Question: {}\n\nExcerpts:\n", question));
    for (idx, doc) in evidence.iter().enumerate() {
        prompt.push_str(&format!("[{}] {}\n", idx + 1, doc.content));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_labels() {
        assert_eq!(Relevance::parse("CAN_ANSWER"), Relevance::CanAnswer);
        assert_eq!(Relevance::parse("the label is PARTIAL here"), Relevance::Partial);
        assert_eq!(Relevance::parse("OFF_TOPIC"), Relevance::OffTopic);
        assert_eq!(Relevance::parse("NO_DATA"), Relevance::NoData);
    }

    #[test]
    fn test_parse_garbage_maps_to_no_data() {
        assert_eq!(Relevance::parse("I am not sure what to say"), Relevance::NoData);
        assert_eq!(Relevance::parse(""), Relevance::NoData);
    }

    #[test]
    fn test_proceed_mapping() {
        assert!(Relevance::CanAnswer.proceed());
        assert!(Relevance::Partial.proceed());
        assert!(!Relevance::NoData.proceed());
        assert!(!Relevance::OffTopic.proceed());
    }

    #[test]
    fn test_prompt_contains_question_and_evidence() {
        let evidence = vec![Document::new(
            "The Eiffel Tower is 330m tall.",
            Default::default(),
        )];
        let prompt = build_prompt("How tall is it?", &evidence);
        assert!(prompt.contains("How tall is it?"));
        assert!(prompt.contains("330m"));
        assert!(prompt.contains("CAN_ANSWER"));
    }
}
