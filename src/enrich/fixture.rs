use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

use super::mock::fnv1a;
use super::EnrichmentProvider;
use crate::account::AccountRecord;

/// Enrichment read from a JSON file keyed by company name.
///
/// ```json
/// { "Acme": { "employees": "12000", "revenue": "$2B" } }
/// ```
///
/// Lookups ignore case. A company missing from the file fails enrichment.
#[derive(Debug, Clone, Default)]
pub struct FixtureEnricher {
    fixtures: HashMap<String, AccountRecord>,
    /// Source path (if any) and a hash of the fixture content
    scope: String,
}

impl FixtureEnricher {
    pub fn new(fixtures: HashMap<String, AccountRecord>) -> Self {
        let fixtures: HashMap<String, AccountRecord> = fixtures
            .into_iter()
            .map(|(name, fields)| (fixture_key(&name), fields))
            .collect();

        let mut entries: Vec<_> = fixtures.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        let canonical = serde_json::to_string(&entries).unwrap_or_default();
        let scope = format!("{:016x}", fnv1a(canonical.as_bytes()));

        Self { fixtures, scope }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let fixtures: HashMap<String, AccountRecord> =
            serde_json::from_str(json).context("Failed to parse enrichment fixtures")?;
        Ok(Self::new(fixtures))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixtures at {}", path.display()))?;
        let mut enricher = Self::from_json(&content)
            .with_context(|| format!("Invalid fixtures file {}", path.display()))?;
        enricher.scope = format!("{}#{}", path.display(), enricher.scope);
        Ok(enricher)
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }
}

fn fixture_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[async_trait]
impl EnrichmentProvider for FixtureEnricher {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn cache_scope(&self) -> String {
        self.scope.clone()
    }

    async fn enrich(&self, account: &AccountRecord) -> Result<AccountRecord> {
        let company = account
            .company_name()
            .ok_or_else(|| anyhow!("Account has no company name"))?;
        self.fixtures
            .get(&fixture_key(company))
            .cloned()
            .ok_or_else(|| anyhow!("No enrichment fixture for '{}'", company))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::FieldValue;

    const FIXTURES: &str = r#"{
        "Acme": { "employees": "12000", "revenue": "$2B" },
        "Globex": { "employees": "Unknown", "revenue": "Unknown" }
    }"#;

    #[tokio::test]
    async fn test_lookup_ignores_case() {
        let enricher = FixtureEnricher::from_json(FIXTURES).unwrap();
        assert_eq!(enricher.len(), 2);

        let account: AccountRecord = [("company", " acme ")].into_iter().collect();
        let fields = enricher.enrich(&account).await.unwrap();
        assert_eq!(fields.get("revenue"), Some(&FieldValue::from("$2B")));
    }

    #[tokio::test]
    async fn test_unknown_company_fails() {
        let enricher = FixtureEnricher::from_json(FIXTURES).unwrap();
        let account: AccountRecord = [("company", "Initech")].into_iter().collect();
        let err = enricher.enrich(&account).await.unwrap_err();
        assert!(err.to_string().contains("Initech"));
    }

    #[tokio::test]
    async fn test_account_without_name_fails() {
        let enricher = FixtureEnricher::default();
        let account: AccountRecord = [("country", "US")].into_iter().collect();
        assert!(enricher.enrich(&account).await.is_err());
    }

    #[test]
    fn test_cache_scope_follows_content() {
        let a = FixtureEnricher::from_json(FIXTURES).unwrap();
        let same = FixtureEnricher::from_json(FIXTURES).unwrap();
        let edited =
            FixtureEnricher::from_json(r#"{ "Acme": { "employees": "12000", "revenue": "$5M" } }"#)
                .unwrap();
        assert_eq!(a.cache_scope(), same.cache_scope());
        assert_ne!(a.cache_scope(), edited.cache_scope());
    }

    #[test]
    fn test_invalid_json() {
        assert!(FixtureEnricher::from_json("[1, 2]").is_err());
    }
}
