use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::{parse_enrichment, EnrichmentProvider};
use crate::account::AccountRecord;

/// Enrichment backed by an HTTP endpoint (typically the key-holding proxy).
///
/// Each account is POSTed as JSON; the response body is the enrichment
/// object. No retries here: a failed call fails that account.
pub struct HttpEnricher {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct EnrichmentRequest<'a> {
    company: Option<&'a str>,
    url: Option<&'a str>,
    account: &'a AccountRecord,
}

impl<'a> EnrichmentRequest<'a> {
    fn new(account: &'a AccountRecord) -> Self {
        Self {
            company: account.company_name(),
            url: account.url(),
            account,
        }
    }
}

impl HttpEnricher {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("account-tier/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl EnrichmentProvider for HttpEnricher {
    fn name(&self) -> &'static str {
        "http"
    }

    fn cache_scope(&self) -> String {
        self.endpoint.clone()
    }

    async fn enrich(&self, account: &AccountRecord) -> Result<AccountRecord> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&EnrichmentRequest::new(account));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                anyhow!("Enrichment request timed out")
            } else if e.is_connect() {
                anyhow!("Could not reach enrichment endpoint {}", self.endpoint)
            } else {
                anyhow!("Enrichment request failed: {}", e)
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(anyhow!(
                "Enrichment endpoint rejected the API key ({})",
                status
            ));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(anyhow!("Enrichment endpoint rate limit exceeded"));
        }
        if !status.is_success() {
            return Err(anyhow!("Enrichment endpoint returned {}", status));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Malformed enrichment response: body is not JSON")?;
        parse_enrichment(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let account: AccountRecord = [
            ("Company Name", "Acme"),
            ("website", "https://acme.test"),
            ("country", "US"),
        ]
        .into_iter()
        .collect();

        let body = serde_json::to_value(EnrichmentRequest::new(&account)).unwrap();
        assert_eq!(body["company"], "Acme");
        assert_eq!(body["url"], "https://acme.test");
        assert_eq!(body["account"]["country"], "US");
    }

    #[test]
    fn test_cache_scope_is_endpoint() {
        let a = HttpEnricher::new("http://localhost:3001/enrich", None, Duration::from_secs(5)).unwrap();
        let b = HttpEnricher::new("https://api.example.com/v2", None, Duration::from_secs(5)).unwrap();
        assert_eq!(a.cache_scope(), "http://localhost:3001/enrich");
        assert_ne!(a.cache_scope(), b.cache_scope());
    }

    #[test]
    fn test_request_body_without_company() {
        let account: AccountRecord = [("country", "US")].into_iter().collect();
        let body = serde_json::to_value(EnrichmentRequest::new(&account)).unwrap();
        assert!(body["company"].is_null());
        assert!(body["url"].is_null());
    }
}
