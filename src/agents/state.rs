//! Workflow state machine and per-run agent state
//!
//! A deterministic finite state machine over the pipeline graph:
//! CheckRelevance -> {Research <-> Verify} -> Terminal. Research/Verify
//! cycling is bounded by the controller's retry policy, not the machine
//! itself; the machine only guarantees that every transition is one of the
//! declared edges.

use serde::{Deserialize, Serialize};

use crate::documents::types::Document;
use crate::errors::{DocChatError, Result};

/// Pipeline execution states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowState {
    /// Entry: decide whether the evidence can answer the question at all
    CheckRelevance,
    /// Drafting an answer from the fixed evidence set
    Research,
    /// Checking the draft against the evidence
    Verify,
    /// Pipeline finished (terminal)
    Terminal,
}

/// Events that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// Gate judged the evidence sufficient (fully or partially)
    RelevanceConfirmed,
    /// Gate judged the question unanswerable from the evidence
    RelevanceRejected,
    /// A draft answer was produced
    DraftComplete,
    /// Verification failed on content grounds; re-draft
    VerificationFailed,
    /// Verification passed (or was ambiguous, which passes through)
    VerificationPassed,
    /// The retry cap was reached; terminate with the last draft
    RetriesExhausted,
}

impl WorkflowState {
    /// Check if this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Terminal)
    }

    /// Attempt a state transition
    ///
    /// Valid edges:
    /// 1. CheckRelevance -> Research   (RelevanceConfirmed)
    /// 2. CheckRelevance -> Terminal   (RelevanceRejected)
    /// 3. Research       -> Verify     (DraftComplete)
    /// 4. Verify         -> Research   (VerificationFailed)
    /// 5. Verify         -> Terminal   (VerificationPassed | RetriesExhausted)
    /// 6. Terminal       -> Terminal   (any event; terminal self-loop)
    pub fn transition(&self, event: WorkflowEvent) -> Result<WorkflowState> {
        use WorkflowEvent::*;
        use WorkflowState::*;

        let next = match (self, event) {
            (CheckRelevance, RelevanceConfirmed) => Research,
            (CheckRelevance, RelevanceRejected) => Terminal,
            (Research, DraftComplete) => Verify,
            (Verify, VerificationFailed) => Research,
            (Verify, VerificationPassed) => Terminal,
            (Verify, RetriesExhausted) => Terminal,
            (Terminal, _) => Terminal,
            (from, event) => {
                return Err(DocChatError::InvalidTransition {
                    from: format!("{:?}", from),
                    to: format!("(via {:?})", event),
                    reason: format!("No valid transition from {:?} on {:?}", from, event),
                });
            }
        };

        Ok(next)
    }

    /// All valid events from this state
    pub fn valid_events(&self) -> Vec<WorkflowEvent> {
        use WorkflowEvent::*;
        use WorkflowState::*;

        match self {
            CheckRelevance => vec![RelevanceConfirmed, RelevanceRejected],
            Research => vec![DraftComplete],
            Verify => vec![VerificationFailed, VerificationPassed, RetriesExhausted],
            Terminal => Vec::new(),
        }
    }
}

/// Mutable record threaded through one pipeline run
///
/// Owned by the workflow controller for the duration of one
/// `full_pipeline` call; each run gets a fresh instance and nothing is
/// shared across concurrent questions.
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    /// The user's question
    pub question: String,
    /// Evidence set, fixed for the whole run
    pub documents: Vec<Document>,
    /// Current draft answer
    pub draft_answer: String,
    /// Rendered verification report
    pub verification_report: String,
    /// Gate decision for this run
    pub is_relevant: bool,
}

impl AgentState {
    /// Fresh state for one pipeline run
    pub fn new(question: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            question: question.into(),
            documents,
            draft_answer: String::new(),
            verification_report: String::new(),
            is_relevant: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut state = WorkflowState::CheckRelevance;
        state = state.transition(WorkflowEvent::RelevanceConfirmed).unwrap();
        assert_eq!(state, WorkflowState::Research);
        state = state.transition(WorkflowEvent::DraftComplete).unwrap();
        assert_eq!(state, WorkflowState::Verify);
        state = state.transition(WorkflowEvent::VerificationPassed).unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_irrelevant_short_circuit() {
        let state = WorkflowState::CheckRelevance
            .transition(WorkflowEvent::RelevanceRejected)
            .unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_verify_cycles_back_to_research() {
        let state = WorkflowState::Verify
            .transition(WorkflowEvent::VerificationFailed)
            .unwrap();
        assert_eq!(state, WorkflowState::Research);
    }

    #[test]
    fn test_retries_exhausted_terminates() {
        let state = WorkflowState::Verify
            .transition(WorkflowEvent::RetriesExhausted)
            .unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let result = WorkflowState::Research.transition(WorkflowEvent::RelevanceConfirmed);
        assert!(matches!(result, Err(DocChatError::InvalidTransition { .. })));
    }

    #[test]
    fn test_terminal_self_loop() {
        for event in [
            WorkflowEvent::RelevanceConfirmed,
            WorkflowEvent::DraftComplete,
            WorkflowEvent::VerificationPassed,
        ] {
            assert_eq!(
                WorkflowState::Terminal.transition(event).unwrap(),
                WorkflowState::Terminal
            );
        }
    }

    #[test]
    fn test_determinism() {
        let a = WorkflowState::Verify.transition(WorkflowEvent::VerificationFailed);
        let b = WorkflowState::Verify.transition(WorkflowEvent::VerificationFailed);
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[test]
    fn test_fresh_agent_state() {
        let state = AgentState::new("question?", Vec::new());
        assert!(!state.is_relevant);
        assert!(state.draft_answer.is_empty());
        assert!(state.verification_report.is_empty());
    }
}
