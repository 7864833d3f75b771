use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use super::EnrichmentProvider;
use crate::account::AccountRecord;

/// Get the platform-appropriate cache directory for enrichment results
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("account-tier/enrichment"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/account-tier/enrichment",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Clear the enrichment cache directory
pub fn clear_cache() -> Result<()> {
    let cache_path = get_cache_path();
    match std::fs::remove_dir_all(&cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

/// Caches successful enrichments from any provider.
///
/// Results live in memory for the run and, when a directory is given, on
/// disk via cacache so later runs skip the upstream call. Failures are never
/// cached.
pub struct CachedEnricher {
    inner: Box<dyn EnrichmentProvider>,
    memory: Mutex<HashMap<String, AccountRecord>>,
    cache_path: Option<PathBuf>,
}

impl CachedEnricher {
    pub fn new(inner: Box<dyn EnrichmentProvider>, cache_path: Option<PathBuf>) -> Self {
        Self {
            inner,
            memory: Mutex::new(HashMap::new()),
            cache_path,
        }
    }

    /// Cache key: provider and its scope, then company and URL case-folded
    fn key(&self, account: &AccountRecord) -> String {
        format!(
            "{}:{}:{}|{}",
            self.inner.name(),
            self.inner.cache_scope(),
            account.company_name().unwrap_or_default().to_lowercase(),
            account.url().unwrap_or_default().to_lowercase()
        )
    }

    fn lookup(&self, key: &str) -> Option<AccountRecord> {
        if let Ok(memory) = self.memory.lock() {
            if let Some(hit) = memory.get(key) {
                return Some(hit.clone());
            }
        }

        // Sync cacache calls: entries are small and the batch awaits one account at a time
        let cache_path = self.cache_path.as_ref()?;
        let bytes = cacache::read_sync(cache_path, key).ok()?;
        let fields: AccountRecord = serde_json::from_slice(&bytes).ok()?;

        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(key.to_string(), fields.clone());
        }
        Some(fields)
    }

    fn store(&self, key: &str, fields: &AccountRecord) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(key.to_string(), fields.clone());
        }

        // Disk errors only cost a future cache miss
        if let Some(ref cache_path) = self.cache_path {
            if let Ok(serialized) = serde_json::to_vec(fields) {
                if let Err(e) = cacache::write_sync(cache_path, key, &serialized) {
                    log::debug!("Failed to write enrichment cache entry {}: {}", key, e);
                }
            }
        }
    }
}

#[async_trait]
impl EnrichmentProvider for CachedEnricher {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn cache_scope(&self) -> String {
        self.inner.cache_scope()
    }

    async fn enrich(&self, account: &AccountRecord) -> Result<AccountRecord> {
        // Unnamed accounts would all share one key
        if account.company_name().is_none() {
            return self.inner.enrich(account).await;
        }

        let key = self.key(account);
        if let Some(hit) = self.lookup(&key) {
            log::debug!("Enrichment cache hit for {}", key);
            return Ok(hit);
        }

        let fields = self.inner.enrich(account).await?;
        self.store(&key, &fields);
        Ok(fields)
    }
}
