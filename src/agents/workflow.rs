//! Workflow controller: sequences the gate, drafter, and verifier
//!
//! Drives the state machine in [`crate::agents::state`] over a fresh
//! [`AgentState`] per run. The Research/Verify cycle is bounded by
//! `max_research_cycles`; exhaustion terminates with the last draft and an
//! annotated report instead of looping.

use std::sync::Arc;
use tracing::{debug, info};

use crate::agents::relevance::RelevanceChecker;
use crate::agents::research::ResearchAgent;
use crate::agents::state::{AgentState, WorkflowEvent, WorkflowState};
use crate::agents::verification::VerificationAgent;
use crate::config::{RetrievalConfig, WorkflowConfig};
use crate::errors::Result;
use crate::index::hybrid::Retriever;
use crate::llm::LanguageModel;

/// Fixed user-facing message for questions the evidence cannot answer
pub const NOT_RELEVANT_MESSAGE: &str =
    "This question isn't related (or there's no data) for your query. \
     Please ask another question relevant to the uploaded document(s).";

/// Final result of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The answer to show the user
    pub draft_answer: String,
    /// Rendered verification report (empty when the gate short-circuits)
    pub verification_report: String,
    /// Whether the gate judged the question answerable
    pub is_relevant: bool,
}

/// Sequences relevance gating, drafting, and verification
pub struct AgentWorkflow {
    relevance_checker: RelevanceChecker,
    researcher: ResearchAgent,
    verifier: VerificationAgent,
    workflow_config: WorkflowConfig,
    retrieval_config: RetrievalConfig,
}

impl AgentWorkflow {
    /// Create a workflow with default policy over one language model
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self::with_config(model, WorkflowConfig::default(), RetrievalConfig::default())
    }

    /// Create a workflow with custom retry and retrieval policy
    pub fn with_config(
        model: Arc<dyn LanguageModel>,
        workflow_config: WorkflowConfig,
        retrieval_config: RetrievalConfig,
    ) -> Self {
        Self {
            relevance_checker: RelevanceChecker::new(model.clone()),
            researcher: ResearchAgent::new(model.clone()),
            verifier: VerificationAgent::new(model),
            workflow_config,
            retrieval_config,
        }
    }

    /// Run the full pipeline for one question
    ///
    /// Errors from any stage propagate; no partial result is returned on
    /// failure. The evidence set is retrieved once and fixed for the whole
    /// run, including re-drafts.
    pub async fn full_pipeline(
        &self,
        question: &str,
        retriever: &dyn Retriever,
    ) -> Result<PipelineOutcome> {
        info!(question, "starting pipeline run");

        let documents = retriever
            .query(question, self.retrieval_config.top_k)
            .await?;
        debug!(retrieved = documents.len(), "evidence set fixed for run");

        let mut agent_state = AgentState::new(question, documents);
        let mut state = WorkflowState::CheckRelevance;
        let mut research_cycles = 0usize;

        while !state.is_terminal() {
            state = match state {
                WorkflowState::CheckRelevance => {
                    let classification = self
                        .relevance_checker
                        .check(question, retriever, self.retrieval_config.relevance_top_k)
                        .await?;

                    if classification.proceed() {
                        agent_state.is_relevant = true;
                        state.transition(WorkflowEvent::RelevanceConfirmed)?
                    } else {
                        info!(?classification, "gate rejected question");
                        agent_state.is_relevant = false;
                        agent_state.draft_answer = NOT_RELEVANT_MESSAGE.to_string();
                        state.transition(WorkflowEvent::RelevanceRejected)?
                    }
                }

                WorkflowState::Research => {
                    research_cycles += 1;
                    debug!(cycle = research_cycles, "drafting");
                    agent_state.draft_answer = self
                        .researcher
                        .generate(&agent_state.question, &agent_state.documents)
                        .await?;
                    state.transition(WorkflowEvent::DraftComplete)?
                }

                WorkflowState::Verify => {
                    let mut report = self
                        .verifier
                        .check(&agent_state.draft_answer, &agent_state.documents)
                        .await?;

                    if report.needs_redraft() {
                        if research_cycles >= self.workflow_config.max_research_cycles {
                            info!(
                                cycles = research_cycles,
                                "retry cap reached, terminating with last draft"
                            );
                            report.annotate_unresolved(research_cycles);
                            agent_state.verification_report = report.render();
                            state.transition(WorkflowEvent::RetriesExhausted)?
                        } else {
                            info!("verification failed, re-drafting");
                            state.transition(WorkflowEvent::VerificationFailed)?
                        }
                    } else {
                        agent_state.verification_report = report.render();
                        state.transition(WorkflowEvent::VerificationPassed)?
                    }
                }

                WorkflowState::Terminal => state,
            };
        }

        info!(is_relevant = agent_state.is_relevant, "pipeline run finished");
        Ok(PipelineOutcome {
            draft_answer: agent_state.draft_answer,
            verification_report: agent_state.verification_report,
            is_relevant: agent_state.is_relevant,
        })
    }
}
