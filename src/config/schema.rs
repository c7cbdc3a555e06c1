use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scoring::Weights;

/// Configuration file contents.
///
/// Example YAML:
/// ```yaml
/// user_id: inspector-014
/// api:
///   base_url: https://inspections.example.org/api
///   timeout_secs: 30
/// weights:
///   availability: 0.4
///   quality: 0.6
/// rubric_dir: /etc/inspect-score/rubrics
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Identifier of the person filling evaluations; part of every draft key
    #[serde(default)]
    pub user_id: Option<String>,

    /// Remote endpoint that receives submitted evaluations
    #[serde(default)]
    pub api: Option<ApiConfig>,

    /// Availability/quality weights (default: 0.4 / 0.6)
    #[serde(default)]
    pub weights: Option<Weights>,

    /// Directory of `*.yaml` rubric files overriding the built-in tables
    #[serde(default)]
    pub rubric_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Config {
    pub fn effective_weights(&self) -> Weights {
        self.weights.unwrap_or_default()
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}
