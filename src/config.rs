//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.signalmesh.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Dispatch and probing settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Node directory settings.
    #[serde(default)]
    pub nodes: NodesConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the server binds to.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Shared secret for the admin endpoints.
    ///
    /// Empty means the admin surface is disabled (all requests get 401).
    /// Usually supplied via the SIGNALMESH_ADMIN_KEY env var instead.
    #[serde(default)]
    pub admin_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            admin_key: String::new(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

/// Dispatch and probing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Shared deadline for one analysis fan-out, in seconds.
    ///
    /// All node calls share this single deadline; a node finishing just
    /// before it succeeds, one finishing after is cancelled.
    #[serde(default = "default_deadline")]
    pub deadline_seconds: u64,

    /// Per-call bound for the health probe's capability request, in seconds.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            deadline_seconds: default_deadline(),
            ping_timeout_seconds: default_ping_timeout(),
        }
    }
}

fn default_deadline() -> u64 {
    15
}

fn default_ping_timeout() -> u64 {
    8
}

/// Node directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodesConfig {
    /// Path to the node descriptor store.
    #[serde(default = "default_store")]
    pub store: String,
}

impl Default for NodesConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
        }
    }
}

fn default_store() -> String {
    "nodes.toml".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".signalmesh.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref listen) = args.listen {
            self.server.listen = listen.clone();
        }
        if let Some(ref key) = args.admin_key {
            self.server.admin_key = key.clone();
        }
        if let Some(ref store) = args.nodes {
            self.nodes.store = store.display().to_string();
        }
        if let Some(deadline) = args.deadline {
            self.dispatch.deadline_seconds = deadline;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.dispatch.deadline_seconds, 15);
        assert_eq!(config.dispatch.ping_timeout_seconds, 8);
        assert_eq!(config.nodes.store, "nodes.toml");
        assert!(config.server.admin_key.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[server]
listen = "127.0.0.1:9000"
admin_key = "hunter2"

[dispatch]
deadline_seconds = 30

[nodes]
store = "/var/lib/signalmesh/nodes.toml"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:9000");
        assert_eq!(config.server.admin_key, "hunter2");
        assert_eq!(config.dispatch.deadline_seconds, 30);
        // Unspecified sections keep their defaults.
        assert_eq!(config.dispatch.ping_timeout_seconds, 8);
        assert_eq!(config.nodes.store, "/var/lib/signalmesh/nodes.toml");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[dispatch]"));
        assert!(toml_str.contains("[nodes]"));
    }
}
