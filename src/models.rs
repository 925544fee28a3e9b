//! Data models for the consensus engine.
//!
//! This module contains all the core data structures used throughout
//! the application for representing nodes, requests, and analysis outcomes.
//! Wire field names match the JSON contract consumed by the dashboard
//! (camelCase outcome fields, lowercase enum values).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three fixed analytical roles a node can embody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    /// Technical analyst - indicators, levels, patterns.
    Analyst,
    /// Risk manager - stops, sizing, volatility.
    Risk,
    /// Strategist - synthesizes everything into a final decision.
    Strategist,
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Persona::Analyst => write!(f, "analyst"),
            Persona::Risk => write!(f, "risk"),
            Persona::Strategist => write!(f, "strategist"),
        }
    }
}

/// Advisory health status of a node.
///
/// Written only by the health probe, read only for presentation.
/// The dispatch path never consults this field - a node marked
/// offline is still attempted, since the status may be stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Last probe got a 2xx from the node.
    Online,
    /// Last probe got a non-2xx response.
    Degraded,
    /// Last probe failed at the network level, or never ran.
    #[default]
    Offline,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Online => write!(f, "online"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Offline => write!(f, "offline"),
        }
    }
}

/// A remotely reachable inference node serving one persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Stable node identifier.
    pub id: String,
    /// Human-readable label shown in the dashboard.
    pub label: String,
    /// Analytical persona bound to this node.
    pub persona: Persona,
    /// Ollama model identifier to request on this node.
    pub model: String,
    /// Endpoint host. May be empty, which excludes the node from dispatch.
    #[serde(default)]
    pub host: String,
    /// Endpoint port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Advisory status, written by the health probe only.
    #[serde(default)]
    pub status: HealthStatus,
    /// When the health probe last wrote a status for this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
}

fn default_port() -> u16 {
    11434
}

impl NodeDescriptor {
    /// A node is dispatchable only if it has an endpoint configured.
    pub fn has_endpoint(&self) -> bool {
        !self.host.trim().is_empty()
    }

    /// Base URL for this node's Ollama API.
    pub fn endpoint_base(&self) -> String {
        format!("http://{}:{}", self.host.trim(), self.port)
    }
}

/// Market mode selecting which persona prompt set is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketMode {
    #[default]
    Forex,
    Futures,
}

impl MarketMode {
    /// Uppercase label used in the unified signal summary.
    pub fn as_upper(&self) -> &'static str {
        match self {
            MarketMode::Forex => "FOREX",
            MarketMode::Futures => "FUTURES",
        }
    }
}

impl fmt::Display for MarketMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketMode::Forex => write!(f, "forex"),
            MarketMode::Futures => write!(f, "futures"),
        }
    }
}

/// Inbound analysis request.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    /// Free-text trading question. Must be non-empty.
    #[serde(default)]
    pub query: String,
    /// Market mode, defaults to forex.
    #[serde(default, rename = "marketMode")]
    pub market_mode: MarketMode,
}

/// A successful response from one persona node.
///
/// Success and failure are mutually exclusive: failed calls become
/// [`NodeFailure`] entries instead, never a `PersonaResult` with empty content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaResult {
    pub persona: Persona,
    /// Reasoning extracted from a `<think>` block, empty if absent.
    pub thinking: String,
    /// Final content with any think block removed.
    pub content: String,
}

/// A per-node failure captured during fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeFailure {
    pub persona: Persona,
    pub error: String,
}

/// Final directional decision sourced from the strategist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalAction::Buy => write!(f, "BUY"),
            SignalAction::Sell => write!(f, "SELL"),
            SignalAction::Hold => write!(f, "HOLD"),
        }
    }
}

/// The unified trading signal derived from the strategist's response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedSignal {
    pub action: SignalAction,
    /// Confidence percentage, 0-100.
    pub confidence: u8,
    /// Opaque display text reporting responded/queried counts and mode.
    pub summary: String,
}

/// Directional lean extracted from free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Lean {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Lean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lean::Bullish => write!(f, "BULLISH"),
            Lean::Bearish => write!(f, "BEARISH"),
            Lean::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// One persona's extracted directional vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaVote {
    pub persona: Persona,
    pub lean: Lean,
    pub confidence: u8,
}

/// Informational agreement tally over per-persona directional leans.
///
/// Corroboration only: the unified signal action is always sourced from
/// the strategist's explicit text and is never overridden by this tally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusTally {
    pub bullish_count: usize,
    pub bearish_count: usize,
    pub total_votes: usize,
    /// round(max(bullish, bearish) / total x 100), 0 when there are no votes.
    pub agreement_pct: u8,
    /// Per-persona votes backing the counts.
    pub votes: Vec<PersonaVote>,
}

/// The complete outcome of one scatter-gather analysis.
///
/// Ephemeral: constructed fresh per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    /// Successful persona results.
    pub responses: Vec<PersonaResult>,
    /// Per-node failures (timeouts, connection errors, HTTP errors).
    pub errors: Vec<NodeFailure>,
    /// True when fewer nodes responded than were dispatched to.
    pub degraded: bool,
    /// Present iff the strategist responded.
    pub unified_signal: Option<UnifiedSignal>,
    /// Informational vote tally over all successful responses.
    pub consensus: ConsensusTally,
    /// Number of nodes dispatched to (the active set).
    pub nodes_queried: usize,
    /// Number of nodes that responded successfully.
    pub nodes_responded: usize,
    /// Set only for the "no nodes configured" outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AnalysisOutcome {
    /// The distinct outcome for an empty active set.
    ///
    /// Not a per-node failure: no node was contacted, so both lists are
    /// empty and the counts are zero. Still success-shaped at the HTTP layer.
    pub fn no_active_nodes() -> Self {
        Self {
            responses: Vec::new(),
            errors: Vec::new(),
            degraded: true,
            unified_signal: None,
            consensus: ConsensusTally::default(),
            nodes_queried: 0,
            nodes_responded: 0,
            error: Some("No active nodes".to_string()),
            detail: Some(
                "No nodes have endpoints configured. Add your Ollama server addresses \
                 via the admin endpoint."
                    .to_string(),
            ),
        }
    }
}

/// Outcome of a single health probe against one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingOutcome {
    pub reachable: bool,
    /// Elapsed milliseconds for the capability call (0 for the no-endpoint case).
    pub latency: u64,
    /// Model names advertised by the node, empty unless reachable.
    #[serde(default)]
    pub models: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_node(host: &str) -> NodeDescriptor {
        NodeDescriptor {
            id: "node-1".to_string(),
            label: "Test Node".to_string(),
            persona: Persona::Analyst,
            model: "llama3.2:latest".to_string(),
            host: host.to_string(),
            port: 11434,
            status: HealthStatus::Offline,
            last_checked: None,
        }
    }

    #[test]
    fn test_has_endpoint() {
        assert!(make_node("10.0.0.5").has_endpoint());
        assert!(!make_node("").has_endpoint());
        assert!(!make_node("   ").has_endpoint());
    }

    #[test]
    fn test_endpoint_base() {
        assert_eq!(make_node("10.0.0.5").endpoint_base(), "http://10.0.0.5:11434");
        assert_eq!(make_node(" 10.0.0.5 ").endpoint_base(), "http://10.0.0.5:11434");
    }

    #[test]
    fn test_persona_wire_names() {
        assert_eq!(serde_json::to_string(&Persona::Analyst).unwrap(), "\"analyst\"");
        assert_eq!(serde_json::to_string(&Persona::Risk).unwrap(), "\"risk\"");
        assert_eq!(
            serde_json::to_string(&Persona::Strategist).unwrap(),
            "\"strategist\""
        );
    }

    #[test]
    fn test_analysis_request_defaults() {
        let req: AnalysisRequest = serde_json::from_str(r#"{"query": "EURUSD?"}"#).unwrap();
        assert_eq!(req.market_mode, MarketMode::Forex);

        let req: AnalysisRequest =
            serde_json::from_str(r#"{"query": "ES?", "marketMode": "futures"}"#).unwrap();
        assert_eq!(req.market_mode, MarketMode::Futures);

        // A missing query deserializes to empty text; validation rejects it later.
        let req: AnalysisRequest = serde_json::from_str("{}").unwrap();
        assert!(req.query.is_empty());
    }

    #[test]
    fn test_outcome_wire_shape() {
        let outcome = AnalysisOutcome::no_active_nodes();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["degraded"], true);
        assert_eq!(json["nodesQueried"], 0);
        assert_eq!(json["nodesResponded"], 0);
        assert!(json["unifiedSignal"].is_null());
        assert_eq!(json["responses"].as_array().unwrap().len(), 0);
        assert_eq!(json["error"], "No active nodes");
    }

    #[test]
    fn test_signal_action_wire_names() {
        assert_eq!(serde_json::to_string(&SignalAction::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&SignalAction::Sell).unwrap(), "\"SELL\"");
        assert_eq!(serde_json::to_string(&SignalAction::Hold).unwrap(), "\"HOLD\"");
    }

    #[test]
    fn test_health_status_default() {
        assert_eq!(HealthStatus::default(), HealthStatus::Offline);
    }
}
