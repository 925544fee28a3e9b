//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Signalmesh - multi-node trading analysis consensus engine
///
/// Fans a trading query out to a fleet of Ollama persona nodes (analyst,
/// risk manager, strategist), joins all outcomes under one deadline and
/// synthesizes a unified signal with an agreement score.
///
/// Examples:
///   signalmesh
///   signalmesh --listen 127.0.0.1:9000 --nodes /etc/signalmesh/nodes.toml
///   signalmesh --ping-all
///   signalmesh --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .signalmesh.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to
    ///
    /// Overrides the config file setting.
    #[arg(short, long, value_name = "ADDR", env = "SIGNALMESH_LISTEN")]
    pub listen: Option<String>,

    /// Path to the node descriptor store
    ///
    /// Created with three default persona nodes if it does not exist.
    #[arg(long, value_name = "FILE")]
    pub nodes: Option<PathBuf>,

    /// Shared secret required on admin endpoints (x-admin-key header)
    #[arg(long, value_name = "KEY", env = "SIGNALMESH_ADMIN_KEY", hide_env_values = true)]
    pub admin_key: Option<String>,

    /// Shared fan-out deadline in seconds
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Probe every configured node once, print the results and exit
    #[arg(long)]
    pub ping_all: bool,

    /// Generate a default .signalmesh.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref listen) = self.listen {
            if listen.parse::<std::net::SocketAddr>().is_err() {
                return Err(format!("Invalid listen address: {}", listen));
            }
        }

        if let Some(deadline) = self.deadline {
            if deadline == 0 {
                return Err("Deadline must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            config: None,
            listen: Some("0.0.0.0:8080".to_string()),
            nodes: None,
            admin_key: None,
            deadline: None,
            verbose: false,
            quiet: false,
            ping_all: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_listen() {
        let mut args = make_args();
        args.listen = Some("not-an-address".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_deadline() {
        let mut args = make_args();
        args.deadline = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
