//! Module that contains the configuration of a node.

use crate::{
    error::{MisraError, Result},
    link::RetryPolicy,
    DEFAULT_CRITICAL_SECTION_MS,
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Struct that holds everything a node needs to join the link and play its part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub listen_port: u16,
    pub peer_address: String,
    #[serde(default)]
    pub initiator: bool,
    #[serde(default)]
    pub loss_probability: f64,
    #[serde(default = "default_critical_section_ms")]
    pub critical_section_ms: u64,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_critical_section_ms() -> u64 {
    DEFAULT_CRITICAL_SECTION_MS
}

impl NodeConfig {
    pub fn new(listen_port: u16, peer_address: String) -> Self {
        Self {
            listen_port,
            peer_address,
            initiator: false,
            loss_probability: 0.,
            critical_section_ms: DEFAULT_CRITICAL_SECTION_MS,
            seed: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Function that returns the config as a JSON formatted `String`.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Function that parses the config from a JSON formatted `String`.
    pub fn from_json_string(config: &str) -> Result<Self> {
        Ok(serde_json::from_str::<Self>(config)?)
    }

    /// Function that reads the config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = std::fs::read_to_string(path).map_err(|source| MisraError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_string(&config)
    }

    pub fn critical_section(&self) -> Duration {
        Duration::from_millis(self.critical_section_ms)
    }

    /// Function that checks the values a file or the command line could get wrong.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.loss_probability) {
            return Err(MisraError::InvalidProbability(self.loss_probability));
        }
        if self.peer_address.trim().is_empty() {
            return Err(MisraError::Config(String::from("the peer address is empty")));
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(MisraError::Config(String::from(
                "the initial retry delay is longer than the maximum",
            )));
        }
        if self.retry.max_attempts == Some(0) {
            return Err(MisraError::Config(String::from(
                "the retry budget must allow at least one attempt",
            )));
        }
        Ok(())
    }
}
