use serde::Serialize;

use super::types::AccountRecord;
use crate::scoring::{CriterionScore, Tier};

/// Keys written by [`ScoredAccount`] itself. Uploaded columns with these
/// names (e.g. a re-uploaded export) are dropped from the record.
pub const RESERVED_KEYS: [&str; 5] = [
    "tierScore",
    "tier",
    "justification",
    "enrichmentError",
    "manualOverride",
];

/// Remove reserved keys, returning any non-blank uploaded justification
fn strip_reserved(account: &mut AccountRecord) -> Option<String> {
    let justification = account
        .remove("justification")
        .filter(|v| !v.is_blank())
        .map(|v| v.to_string());
    for key in RESERVED_KEYS {
        account.remove(key);
    }
    justification
}

/// An account after the batch has enriched, scored and tiered it.
///
/// `tier_score` is fixed at construction. `tier` and `justification` can be
/// changed afterwards through [`ScoredAccount::override_tier`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredAccount {
    #[serde(flatten)]
    pub account: AccountRecord,
    tier_score: u8,
    pub tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment_error: Option<String>,
    pub manual_override: bool,
    #[serde(skip)]
    pub breakdown: Vec<CriterionScore>,
}

impl ScoredAccount {
    pub fn scored(
        mut account: AccountRecord,
        tier_score: u8,
        tier: Tier,
        justification: Option<String>,
        breakdown: Vec<CriterionScore>,
    ) -> Self {
        let uploaded = strip_reserved(&mut account);
        Self {
            account,
            tier_score,
            tier,
            justification: justification.or(uploaded),
            enrichment_error: None,
            manual_override: false,
            breakdown,
        }
    }

    /// An account whose enrichment failed: score 0, lowest tier, error kept.
    pub fn failed(mut account: AccountRecord, error: String) -> Self {
        let justification = strip_reserved(&mut account);
        Self {
            account,
            tier_score: 0,
            tier: Tier::lowest(),
            justification,
            enrichment_error: Some(error),
            manual_override: false,
            breakdown: Vec::new(),
        }
    }

    pub fn tier_score(&self) -> u8 {
        self.tier_score
    }

    pub fn is_failed(&self) -> bool {
        self.enrichment_error.is_some()
    }

    pub fn name(&self) -> &str {
        self.account.display_name()
    }

    /// Replace the tier (and optionally the justification) by hand.
    /// The computed score is left as it was.
    pub fn override_tier(&mut self, tier: Tier, justification: Option<String>) {
        self.tier = tier;
        if justification.is_some() {
            self.justification = justification;
        }
        self.manual_override = true;
    }
}
