//! Health probe.
//!
//! Pings one node's capability endpoint and records an advisory status.
//! Runs on a caller-invoked path fully independent of analysis dispatch:
//! the status it writes is presentation telemetry and never gates whether
//! a node gets queried. Probes are independent across nodes - no
//! cross-node coordination.

use crate::client::InferenceClient;
use crate::directory::NodeDirectory;
use crate::error::NodeError;
use crate::models::{HealthStatus, PingOutcome};
use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub struct HealthProbe {
    directory: Arc<NodeDirectory>,
    client: InferenceClient,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(directory: Arc<NodeDirectory>, client: InferenceClient, timeout: Duration) -> Self {
        Self {
            directory,
            client,
            timeout,
        }
    }

    /// Probes one node and persists the advisory status.
    ///
    /// Returns `Ok(None)` for an unknown node id. A node without an
    /// endpoint yields an unreachable outcome and performs no status
    /// write; every other path performs exactly one.
    pub async fn ping(&self, node_id: &str) -> Result<Option<PingOutcome>> {
        let Some(node) = self.directory.read_one(node_id)? else {
            return Ok(None);
        };

        if !node.has_endpoint() {
            debug!("Node {} has no endpoint, skipping probe", node.id);
            return Ok(Some(PingOutcome {
                reachable: false,
                latency: 0,
                models: Vec::new(),
                error: Some("No endpoint configured".to_string()),
            }));
        }

        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, self.client.list_models(&node)).await;
        let latency = start.elapsed().as_millis() as u64;

        let (status, outcome) = match result {
            Ok(Ok(models)) => {
                debug!("Node {} reachable in {}ms", node.id, latency);
                (
                    HealthStatus::Online,
                    PingOutcome {
                        reachable: true,
                        latency,
                        models,
                        error: None,
                    },
                )
            }
            Ok(Err(NodeError::Http { status, .. })) => {
                warn!("Node {} answered HTTP {}", node.id, status);
                (
                    HealthStatus::Degraded,
                    PingOutcome {
                        reachable: false,
                        latency,
                        models: Vec::new(),
                        error: Some(format!("HTTP {}", status)),
                    },
                )
            }
            Ok(Err(e)) => {
                warn!("Node {} unreachable: {}", node.id, e);
                (
                    HealthStatus::Offline,
                    PingOutcome {
                        reachable: false,
                        latency,
                        models: Vec::new(),
                        error: Some(e.to_string()),
                    },
                )
            }
            Err(_) => {
                warn!("Node {} probe timed out", node.id);
                (
                    HealthStatus::Offline,
                    PingOutcome {
                        reachable: false,
                        latency,
                        models: Vec::new(),
                        error: Some(format!(
                            "Timeout: Node did not respond within {} seconds",
                            self.timeout.as_secs()
                        )),
                    },
                )
            }
        };

        self.directory.record_probe_status(&node.id, status)?;
        Ok(Some(outcome))
    }
}
