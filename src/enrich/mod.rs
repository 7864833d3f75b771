pub mod cache;
pub mod fixture;
pub mod http;
pub mod mock;

pub use cache::{clear_cache, get_cache_path, CachedEnricher};
pub use fixture::FixtureEnricher;
pub use http::HttpEnricher;
pub use mock::MockEnricher;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::account::AccountRecord;
use crate::config::{EnrichmentConfig, ProviderKind};

/// Default request timeout for network-backed enrichment
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Attaches criterion fields (`employees`, `revenue`, `hiringTrends`, ...)
/// to a raw account.
///
/// The returned record holds only the new fields; the caller overlays them
/// onto the original. An optional `justification` field carries free-text
/// reasoning. Any error marks the account as failed for this batch.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// Short name, used in logs and cache keys
    fn name(&self) -> &'static str;

    /// What the results depend on beyond the account itself, such as an
    /// endpoint or a data file's content. Part of the cache key, so changing
    /// it invalidates earlier cached results.
    fn cache_scope(&self) -> String {
        String::new()
    }

    async fn enrich(&self, account: &AccountRecord) -> Result<AccountRecord>;
}

/// Validate a provider's JSON response and turn it into enrichment fields.
///
/// The response must be a JSON object whose values are strings, numbers or
/// null. A `{"data": {...}}` wrapper is unwrapped.
pub fn parse_enrichment(value: serde_json::Value) -> Result<AccountRecord> {
    let value = match value {
        serde_json::Value::Object(mut map) if map.len() == 1 && map.contains_key("data") => {
            map.remove("data").unwrap_or(serde_json::Value::Null)
        }
        other => other,
    };
    if !value.is_object() {
        bail!("Malformed enrichment response: expected a JSON object");
    }
    serde_json::from_value(value).context("Malformed enrichment response")
}

/// Build the provider named in config. `api_key` is only used by `http`.
pub fn build_provider(
    config: &EnrichmentConfig,
    api_key: Option<String>,
) -> Result<Box<dyn EnrichmentProvider>> {
    let provider: Box<dyn EnrichmentProvider> = match config.provider {
        ProviderKind::Mock => Box::new(MockEnricher::new()),
        ProviderKind::Fixture => {
            let path = config
                .fixtures
                .as_ref()
                .context("enrichment.fixtures must be set for the fixture provider")?;
            Box::new(FixtureEnricher::from_path(path)?)
        }
        ProviderKind::Http => {
            let endpoint = config
                .endpoint
                .as_deref()
                .context("enrichment.endpoint must be set for the http provider")?;
            Box::new(HttpEnricher::new(endpoint, api_key, config.timeout()?)?)
        }
    };
    Ok(provider)
}
