use crate::account::{AccountRecord, ScoredAccount};
use crate::enrich::EnrichmentProvider;
use crate::scoring::{calculate_score, classify, Criterion, TIERS};

/// Field carrying the provider's free-text reasoning
const JUSTIFICATION_KEY: &str = "justification";

/// Enrich, score and tier every account in upload order.
///
/// Enrichment calls are awaited one at a time. A failed enrichment never
/// aborts the batch: that account keeps its original fields, scores 0 and
/// lands in the lowest tier with the error message attached. The result has
/// the same length and order as `accounts`.
pub async fn process_batch(
    accounts: Vec<AccountRecord>,
    criteria: &[Criterion],
    enricher: &dyn EnrichmentProvider,
) -> Vec<ScoredAccount> {
    let total = accounts.len();
    let mut results = Vec::with_capacity(total);

    for (index, account) in accounts.into_iter().enumerate() {
        log::debug!(
            "[{}/{}] Enriching {} via {}",
            index + 1,
            total,
            account.display_name(),
            enricher.name()
        );

        let scored = match enricher.enrich(&account).await {
            Ok(fields) => score_enriched(account, fields, criteria),
            Err(e) => {
                log::warn!("Enrichment failed for {}: {:#}", account.display_name(), e);
                ScoredAccount::failed(account, format!("{:#}", e))
            }
        };
        results.push(scored);
    }

    let summary = BatchSummary::from_results(&results);
    log::info!("{}", summary);
    results
}

/// Overlay enrichment fields onto the account, then score and classify it
fn score_enriched(
    account: AccountRecord,
    fields: AccountRecord,
    criteria: &[Criterion],
) -> ScoredAccount {
    let mut enriched = account;
    enriched.merge(fields);

    let justification = enriched
        .remove(JUSTIFICATION_KEY)
        .filter(|v| !v.is_blank())
        .map(|v| v.to_string());

    let result = calculate_score(&enriched, criteria);
    let tier = classify(result.score);
    log::debug!(
        "{}: {:.1}/{} -> {} ({})",
        enriched.display_name(),
        result.total,
        result.possible,
        result.score,
        tier.name
    );

    ScoredAccount::scored(enriched, result.score, tier, justification, result.breakdown)
}

/// Per-tier counts for a processed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    /// Accounts per tier, index 0 is Tier 1
    pub per_tier: [usize; 4],
    pub failed: usize,
    pub overridden: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ScoredAccount]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for account in results {
            if let Some(slot) = TIERS.iter().position(|t| t.id == account.tier.id) {
                summary.per_tier[slot] += 1;
            }
            if account.is_failed() {
                summary.failed += 1;
            }
            if account.manual_override {
                summary.overridden += 1;
            }
        }
        summary
    }

    pub fn succeeded(&self) -> usize {
        self.total - self.failed
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scored {} accounts", self.total)?;
        for (tier, count) in TIERS.iter().zip(self.per_tier.iter()) {
            write!(f, ", {}: {}", tier.name, count)?;
        }
        if self.failed > 0 {
            write!(f, " ({} failed enrichment)", self.failed)?;
        }
        Ok(())
    }
}
