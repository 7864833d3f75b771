use std::fmt;
use std::io::IsTerminal;

use crate::config::EnrichmentConfig;

/// Environment variable read for the enrichment API key when the config names none
pub const DEFAULT_KEY_VAR: &str = "ACCOUNT_TIER_API_KEY";

#[derive(Debug)]
pub enum CredentialError {
    /// Variable unset and no terminal to prompt on
    KeyNotFound(String),
    PromptFailed(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::KeyNotFound(var) => {
                write!(f, "No API key found: set the {} environment variable", var)
            }
            CredentialError::PromptFailed(msg) => write!(f, "Failed to read API key: {}", msg),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Name of the variable holding the API key for this config
pub fn key_var(config: &EnrichmentConfig) -> &str {
    config
        .api_key_env
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(DEFAULT_KEY_VAR)
}

/// Read an API key from the named environment variable.
/// Returns Some(key) if the variable is set and non-empty, None otherwise.
pub fn get_key_from_env(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(val) => {
            let trimmed = val.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

/// Prompt for the API key without echoing it. An empty answer means no key.
pub fn prompt_for_key(var: &str) -> Result<Option<String>, CredentialError> {
    eprintln!("Enrichment API key required (or set {} to skip this prompt).", var);
    eprintln!("Leave empty if the endpoint needs no authentication.");

    let key = rpassword::prompt_password("API key: ")
        .map_err(|e| CredentialError::PromptFailed(e.to_string()))?;
    let key = key.trim();

    if key.is_empty() {
        Ok(None)
    } else {
        Ok(Some(key.to_string()))
    }
}

/// Resolve the API key for the http provider: environment first, then an
/// interactive prompt when stdin is a terminal.
pub fn resolve_api_key(config: &EnrichmentConfig) -> Result<Option<String>, CredentialError> {
    let var = key_var(config);
    if let Some(key) = get_key_from_env(var) {
        log::debug!("Using API key from {}", var);
        return Ok(Some(key));
    }

    if !std::io::stdin().is_terminal() {
        return Err(CredentialError::KeyNotFound(var.to_string()));
    }

    prompt_for_key(var)
}
