//! Error taxonomy for the consensus engine.
//!
//! Per-node errors ([`NodeError`]) are always recovered locally into the
//! outcome's failure list and never abort sibling calls. Only validation
//! and directory errors ([`EngineError`]) escape as request-level failures.

use thiserror::Error;

/// A failure of a single node call. Captured into `AnalysisOutcome.errors`.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The shared dispatch deadline expired before the node answered.
    #[error("Timeout: Node did not respond within {0} seconds")]
    Timeout(u64),

    /// TCP-level connection failure.
    #[error("Cannot connect to node at {0}")]
    Connect(String),

    /// The node answered with a non-2xx status.
    #[error("Node returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Any other transport failure.
    #[error("Request failed: {0}")]
    Network(String),

    /// The node answered 2xx but the body was not the expected shape.
    #[error("Failed to parse node response: {0}")]
    Parse(String),
}

/// A request-level failure. The only two cases where the analysis caller
/// does not receive a structured outcome object.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected before dispatch; no nodes are contacted.
    #[error("Missing 'query' field")]
    EmptyQuery,

    /// The node directory backing store is unreadable.
    #[error("Failed to fetch node configs: {0}")]
    Directory(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_matches_wire_contract() {
        let err = NodeError::Timeout(15);
        assert_eq!(
            err.to_string(),
            "Timeout: Node did not respond within 15 seconds"
        );
    }

    #[test]
    fn test_http_error_carries_status() {
        let err = NodeError::Http {
            status: 500,
            body: "internal error".to_string(),
        };
        assert!(err.to_string().contains("500"));
    }
}
