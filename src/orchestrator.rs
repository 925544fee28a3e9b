//! Scatter-gather orchestrator.
//!
//! The core of the engine: loads the active node set, fans the query out
//! to every node under one shared deadline, joins all outcomes
//! unconditionally (never a race-to-first, since every failure must be
//! captured), and assembles the final analysis outcome.
//!
//! Per-node failures never abort the request - they become failure
//! entries. Only an unreadable node directory is fatal.

use crate::client::InferenceClient;
use crate::consensus;
use crate::directory::NodeDirectory;
use crate::error::{EngineError, NodeError};
use crate::models::{
    AnalysisOutcome, AnalysisRequest, MarketMode, NodeFailure, Persona, PersonaResult,
};
use crate::prompts;
use crate::splitter;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct ScatterGatherOrchestrator {
    directory: Arc<NodeDirectory>,
    client: InferenceClient,
    /// Shared deadline for the whole fan-out.
    deadline: Duration,
}

impl ScatterGatherOrchestrator {
    pub fn new(directory: Arc<NodeDirectory>, client: InferenceClient, deadline: Duration) -> Self {
        Self {
            directory,
            client,
            deadline,
        }
    }

    /// Runs one full scatter-gather analysis.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, EngineError> {
        if request.query.trim().is_empty() {
            return Err(EngineError::EmptyQuery);
        }

        let nodes = self.directory.read_all().map_err(EngineError::Directory)?;

        // Active set = nodes with an endpoint. Persisted health status is
        // advisory only and never consulted here: a node marked offline is
        // still attempted, since the status may be stale.
        let active: Vec<_> = nodes.into_iter().filter(|n| n.has_endpoint()).collect();

        if active.is_empty() {
            warn!("No nodes have endpoints configured, nothing to dispatch");
            return Ok(AnalysisOutcome::no_active_nodes());
        }

        info!(
            "Dispatching {} query to {} nodes",
            request.market_mode,
            active.len()
        );

        let deadline_secs = self.deadline.as_secs();
        let deadline = tokio::time::Instant::now() + self.deadline;

        let calls = active.iter().map(|node| {
            let client = self.client.clone();
            let query = request.query.clone();
            let mode = request.market_mode;
            let node = node.clone();

            async move {
                let prompt = prompts::system_prompt(mode, node.persona);
                let settled =
                    tokio::time::timeout_at(deadline, client.chat(&node, prompt, &query)).await;

                let outcome = match settled {
                    Ok(Ok(raw)) => {
                        let split = splitter::split(&raw);
                        Ok(PersonaResult {
                            persona: node.persona,
                            thinking: split.thinking,
                            content: split.content,
                        })
                    }
                    Ok(Err(e)) => Err(e),
                    // Deadline expiry cancels the in-flight call and is
                    // tagged distinctly from network and HTTP failures.
                    Err(_) => Err(NodeError::Timeout(deadline_secs)),
                };

                (node.persona, outcome)
            }
        });

        // Full barrier: wait for every dispatched call to settle.
        let settled = join_all(calls).await;

        Ok(assemble_outcome(settled, active.len(), request.market_mode))
    }
}

/// Partitions settled calls into results and failures and synthesizes
/// the unified signal and consensus tally.
fn assemble_outcome(
    settled: Vec<(Persona, Result<PersonaResult, NodeError>)>,
    queried: usize,
    mode: MarketMode,
) -> AnalysisOutcome {
    let mut responses = Vec::new();
    let mut errors = Vec::new();

    for (persona, outcome) in settled {
        match outcome {
            Ok(result) => responses.push(result),
            Err(e) => {
                warn!("{} node failed: {}", persona, e);
                errors.push(NodeFailure {
                    persona,
                    error: e.to_string(),
                });
            }
        }
    }

    let responded = responses.len();
    // Degraded is computed against the dispatched set, not total configured nodes.
    let degraded = responded < queried;

    let unified_signal = consensus::unified_signal(&responses, responded, queried, mode);
    let consensus = consensus::tally(&responses);

    info!(
        "Analysis complete: {}/{} nodes responded{}",
        responded,
        queried,
        if degraded { " (degraded)" } else { "" }
    );

    AnalysisOutcome {
        responses,
        errors,
        degraded,
        unified_signal,
        consensus,
        nodes_queried: queried,
        nodes_responded: responded,
        error: None,
        detail: None,
    }
}
