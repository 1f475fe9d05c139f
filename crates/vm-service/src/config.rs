//! Configuration management for the VM service
//!
//! Loads configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server host
    pub host: String,

    /// API server port
    pub port: u16,

    /// Provisioner executable
    pub pulumi_binary: String,

    /// Directory holding the Pulumi project
    pub pulumi_dir: PathBuf,

    /// Stack that `up` and `destroy` act on
    pub pulumi_stack: String,

    /// JSON file backing the VM registry
    pub data_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let config = Config {
            host: var("VM_SERVICE_HOST", "0.0.0.0"),

            port: var("VM_SERVICE_PORT", "8000")
                .parse()
                .context("Invalid VM_SERVICE_PORT")?,

            pulumi_binary: var("PULUMI_BINARY", "pulumi"),

            pulumi_dir: var("PULUMI_DIR", "./src").into(),

            pulumi_stack: var("PULUMI_STACK", "dev"),

            data_file: var("VM_DATA_FILE", "vm_data.json").into(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("VM_SERVICE_PORT must be greater than 0");
        }

        if self.pulumi_stack.trim().is_empty() {
            anyhow::bail!("PULUMI_STACK must not be empty");
        }

        Ok(())
    }

    /// Get the API server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Warn about a missing Pulumi project; `pulumi` will fail on every call without it
    pub fn check_pulumi_dir(&self) {
        if !self.pulumi_dir.is_dir() {
            tracing::warn!(
                "Pulumi project directory does not exist: {}",
                self.pulumi_dir.display()
            );
        }
    }
}
