//! Verifier: check a draft answer against its evidence
//!
//! The verdict is a structured [`VerificationReport`] rather than free
//! text; the controller switches on its fields, never on substrings. The
//! report still renders to (and parses from) text carrying the literal
//! `Supported:` / `Relevant:` markers, which is the wire contract with the
//! language model.

use std::sync::Arc;
use tracing::debug;

use crate::documents::types::Document;
use crate::errors::{DocChatError, Result};
use crate::llm::LanguageModel;

/// Structured verification verdict
///
/// `None` in either field means the model's output carried no parseable
/// marker for that judgment. Ambiguity is a terminal pass-through: the
/// controller returns the draft with the unparsed report rather than
/// looping on a verdict it cannot read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// Is every claim in the draft supported by the evidence?
    pub supported: Option<bool>,
    /// Is the draft relevant to the evidence at all?
    pub relevant: Option<bool>,
    /// The model's free-text rationale
    pub rationale: String,
}

impl VerificationReport {
    /// Parse a model's verification output, scanning for decision markers
    pub fn parse(output: &str) -> Self {
        let upper = output.to_uppercase();
        Self {
            supported: parse_marker(&upper, "SUPPORTED:"),
            relevant: parse_marker(&upper, "RELEVANT:"),
            rationale: output.trim().to_string(),
        }
    }

    /// Whether the controller should cycle back to drafting
    ///
    /// Only an explicit NO retries; a missing marker never does.
    pub fn needs_redraft(&self) -> bool {
        self.supported == Some(false) || self.relevant == Some(false)
    }

    /// Whether both markers parsed
    pub fn is_conclusive(&self) -> bool {
        self.supported.is_some() && self.relevant.is_some()
    }

    /// Render the report for display and for the pipeline result
    pub fn render(&self) -> String {
        let label = |v: Option<bool>| match v {
            Some(true) => "YES",
            Some(false) => "NO",
            None => "UNKNOWN",
        };
        format!(
            "Supported: {}\nRelevant: {}\n\n{}",
            label(self.supported),
            label(self.relevant),
            self.rationale
        )
    }

    /// Annotate the report after the retry cap is exhausted
    pub fn annotate_unresolved(&mut self, attempts: usize) {
        self.rationale = format!(
            "Unresolved after {} research attempts.\n\n{}",
            attempts, self.rationale
        );
    }
}

/// Scan for `marker` followed by YES or NO on the same line
fn parse_marker(upper: &str, marker: &str) -> Option<bool> {
    let start = upper.find(marker)? + marker.len();
    let rest = upper[start..].trim_start();
    if rest.starts_with("YES") {
        Some(true)
    } else if rest.starts_with("NO") {
        Some(false)
    } else {
        None
    }
}

/// Checks draft answers against their evidence
pub struct VerificationAgent {
    model: Arc<dyn LanguageModel>,
}

impl VerificationAgent {
    /// Create a verifier over a language-model capability
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Verify a draft against the evidence set
    pub async fn check(&self, draft: &str, evidence: &[Document]) -> Result<VerificationReport> {
        let prompt = build_prompt(draft, evidence);
        let output = self
            .model
            .complete(&prompt)
            .await
            .map_err(|e| DocChatError::Stage {
                stage: "verify".to_string(),
                reason: e.to_string(),
            })?;

        let report = VerificationReport::parse(&output);
        debug!(
            supported = ?report.supported,
            relevant = ?report.relevant,
            "verification verdict"
        );
        Ok(report)
    }
}

fn build_prompt(draft: &str, evidence: &[Document]) -> String {
    let mut prompt = String::from(
        "You are a verification agent. Check the draft answer below against \
         the excerpts. Judge two things: whether the draft is relevant to \
         the excerpts, and whether every claim in it is supported by them.\n\
         Start your reply with exactly two lines:\n\
         Supported: YES or NO\n\
         Relevant: YES or NO\n\
         Then explain your judgment.\n\n",
    );
    prompt.push_str(&format!("Draft answer:\n{}\n\nExcerpts:\n", draft));
    for (idx, doc) in evidence.iter().enumerate() {
        prompt.push_str(&format!("[{}] {}\n", idx + 1, doc.content));
    }
    prompt
}
