//! Node directory.
//!
//! The collaborator that owns node descriptors. Backed by a small TOML
//! file which is the source of truth: every read goes to disk, mirroring
//! how the dispatch path re-reads the directory per request. Updates are
//! restricted to an explicit allow-list; probe status writes go through a
//! dedicated method so the allow-list stays closed.

use crate::models::{HealthStatus, NodeDescriptor, Persona};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info};

/// On-disk shape of the node store.
#[derive(Debug, Default, Serialize, Deserialize)]
struct NodeStore {
    #[serde(default)]
    nodes: Vec<NodeDescriptor>,
}

/// Allow-listed fields an admin may change on a node.
///
/// `deny_unknown_fields` makes the allow-list structural: a payload
/// carrying any other field is rejected at deserialization instead of
/// being silently dropped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeUpdate {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
    pub label: Option<String>,
    pub status: Option<HealthStatus>,
}

/// File-backed node descriptor store.
pub struct NodeDirectory {
    path: PathBuf,
    /// Serializes read-modify-write cycles. Reads need no lock since the
    /// status field gates no dispatch decision and last-writer-wins is
    /// acceptable for advisory telemetry.
    write_lock: Mutex<()>,
}

impl NodeDirectory {
    /// Opens the store at `path`, seeding the three default persona nodes
    /// when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let dir = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        };

        if dir.path.exists() {
            // Fail fast on an unparseable store instead of at first request.
            dir.load_store()?;
        } else {
            info!("Node store {} not found, seeding defaults", dir.path.display());
            dir.write_store(&NodeStore {
                nodes: seed_nodes(),
            })?;
        }

        Ok(dir)
    }

    /// Returns every node descriptor.
    pub fn read_all(&self) -> Result<Vec<NodeDescriptor>> {
        Ok(self.load_store()?.nodes)
    }

    /// Returns one node by id, `None` if unknown.
    pub fn read_one(&self, id: &str) -> Result<Option<NodeDescriptor>> {
        Ok(self.load_store()?.nodes.into_iter().find(|n| n.id == id))
    }

    /// Applies an allow-listed update to one node.
    ///
    /// Returns `false` when the id is unknown.
    pub fn update_fields(&self, id: &str, update: &NodeUpdate) -> Result<bool> {
        let _guard = self.lock()?;
        let mut store = self.load_store()?;

        let Some(node) = store.nodes.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };

        if let Some(ref host) = update.host {
            node.host = host.clone();
        }
        if let Some(port) = update.port {
            node.port = port;
        }
        if let Some(ref model) = update.model {
            node.model = model.clone();
        }
        if let Some(ref label) = update.label {
            node.label = label.clone();
        }
        if let Some(status) = update.status {
            node.status = status;
        }

        debug!("Updated node {}", id);
        self.write_store(&store)?;
        Ok(true)
    }

    /// Records a probe result: advisory status plus the check timestamp.
    ///
    /// The only writer of `status` at runtime. Exactly one call per ping,
    /// except the no-endpoint case which performs no write at all.
    pub fn record_probe_status(&self, id: &str, status: HealthStatus) -> Result<bool> {
        let _guard = self.lock()?;
        let mut store = self.load_store()?;

        let Some(node) = store.nodes.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };

        node.status = status;
        node.last_checked = Some(Utc::now());

        self.write_store(&store)?;
        Ok(true)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow!("node store lock poisoned"))
    }

    fn load_store(&self) -> Result<NodeStore> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read node store: {}", self.path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse node store: {}", self.path.display()))
    }

    /// Replaces the store atomically: write a sibling temp file, then
    /// rename it over the store. Readers take no lock, so they must never
    /// observe a truncated file mid-write.
    fn write_store(&self, store: &NodeStore) -> Result<()> {
        let content =
            toml::to_string_pretty(store).context("Failed to serialize node store")?;

        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, content)
            .with_context(|| format!("Failed to write node store: {}", tmp.display()))?;

        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace node store: {}", self.path.display()))
    }
}

/// The three default persona nodes, endpoints unset.
///
/// Mirrors the trio the production deployment starts from; with no
/// endpoints configured they are excluded from dispatch until an admin
/// fills the hosts in.
fn seed_nodes() -> Vec<NodeDescriptor> {
    let make = |id: &str, label: &str, persona: Persona| NodeDescriptor {
        id: id.to_string(),
        label: label.to_string(),
        persona,
        model: "llama3.2:latest".to_string(),
        host: String::new(),
        port: 11434,
        status: HealthStatus::Offline,
        last_checked: None,
    };

    vec![
        make("node-analyst", "Analyst Node", Persona::Analyst),
        make("node-risk", "Risk Manager Node", Persona::Risk),
        make("node-strategist", "Strategist Node", Persona::Strategist),
    ]
}
