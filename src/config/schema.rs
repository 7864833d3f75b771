use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::scoring::{default_criteria, CriteriaRegistry, Criterion};

/// Top-level config file.
///
/// Example YAML:
/// ```yaml
/// criteria:
///   - { id: employees, name: Employee Count, weight: 50 }
///   - { id: revenue, name: Annual Revenue, weight: 50 }
/// enrichment:
///   provider: http
///   endpoint: http://localhost:3001/api/enrich
///   timeout: 20s
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Scoring criteria; the built-in set when omitted
    #[serde(default = "default_criteria")]
    pub criteria: Vec<Criterion>,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            criteria: default_criteria(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl Config {
    pub fn registry(&self) -> CriteriaRegistry {
        CriteriaRegistry::new(self.criteria.clone())
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Mock,
    Http,
    Fixture,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(ProviderKind::Mock),
            "http" => Ok(ProviderKind::Http),
            "fixture" => Ok(ProviderKind::Fixture),
            other => Err(format!(
                "unknown provider '{}' (expected mock, http or fixture)",
                other
            )),
        }
    }
}

/// Where enrichment data comes from.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EnrichmentConfig {
    #[serde(default)]
    pub provider: ProviderKind,

    /// URL the http provider POSTs accounts to
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Environment variable holding the API key (default ACCOUNT_TIER_API_KEY)
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Request timeout, e.g. "30s" or "2m"
    #[serde(default)]
    pub timeout: Option<String>,

    /// JSON file for the fixture provider
    #[serde(default)]
    pub fixtures: Option<PathBuf>,
}

impl EnrichmentConfig {
    pub fn timeout(&self) -> Result<Duration> {
        match self.timeout {
            Some(ref t) => humantime::parse_duration(t.trim())
                .with_context(|| format!("enrichment.timeout: invalid duration '{}'", t)),
            None => Ok(crate::enrich::DEFAULT_TIMEOUT),
        }
    }
}
