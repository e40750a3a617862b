//! Multi-agent answer pipeline
//!
//! Relevance gating, drafting, and verification agents sequenced by a
//! bounded state machine in [`workflow::AgentWorkflow`].

pub mod relevance;
pub mod research;
pub mod state;
pub mod verification;
pub mod workflow;

pub use relevance::{Relevance, RelevanceChecker};
pub use research::ResearchAgent;
pub use state::{AgentState, WorkflowEvent, WorkflowState};
pub use verification::{VerificationAgent, VerificationReport};
pub use workflow::{AgentWorkflow, PipelineOutcome, NOT_RELEVANT_MESSAGE};
