//! Inference client.
//!
//! Thin reqwest wrapper for the two outbound Ollama calls: the chat
//! dispatch (`POST /api/chat`) and the capability probe (`GET /api/tags`).
//! Deadlines are owned by the callers - the orchestrator applies one
//! shared deadline across the whole fan-out, the probe its own bound -
//! so the client itself carries no timeout.

use crate::error::NodeError;
use crate::models::NodeDescriptor;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Message in the chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

/// Ollama tags API response.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

/// Client for one bounded network call to one node.
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
}

impl InferenceClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Sends the persona-framed query to one node's chat endpoint and
    /// returns the raw model output.
    pub async fn chat(
        &self,
        node: &NodeDescriptor,
        system_prompt: &str,
        query: &str,
    ) -> Result<String, NodeError> {
        let url = format!("{}/api/chat", node.endpoint_base());

        let request = ChatRequest {
            model: &node.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: query.to_string(),
                },
            ],
            stream: false,
        };

        debug!("Dispatching {} query to {}", node.persona, url);

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_transport_error(e, node))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NodeError::Http { status, body });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| NodeError::Parse(e.to_string()))?;

        Ok(chat.message.content)
    }

    /// Fetches the model names a node advertises. Used by the health probe.
    pub async fn list_models(&self, node: &NodeDescriptor) -> Result<Vec<String>, NodeError> {
        let url = format!("{}/api/tags", node.endpoint_base());

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| map_transport_error(e, node))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(NodeError::Http { status, body });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| NodeError::Parse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

impl Default for InferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

fn map_transport_error(e: reqwest::Error, node: &NodeDescriptor) -> NodeError {
    if e.is_connect() {
        NodeError::Connect(node.endpoint_base())
    } else {
        NodeError::Network(e.to_string())
    }
}
