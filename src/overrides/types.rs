use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::scoring::Tier;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideState {
    pub version: u32,
    #[serde(default)]
    pub overrides: HashMap<String, TierOverride>,
}

/// A manual tier assignment for one company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierOverride {
    pub tier_id: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    pub overridden_at: DateTime<Utc>,
}

impl TierOverride {
    /// The tier this override points at; None when the stored id is not 1-4
    pub fn tier(&self) -> Option<Tier> {
        Tier::from_id(self.tier_id)
    }
}

/// Overrides are matched on the case-folded, trimmed company name
pub fn override_key(company: &str) -> String {
    company.trim().to_lowercase()
}

impl Default for OverrideState {
    fn default() -> Self {
        Self::new()
    }
}

impl OverrideState {
    /// Create a new empty override state with version 1
    pub fn new() -> Self {
        Self {
            version: 1,
            overrides: HashMap::new(),
        }
    }

    pub fn get(&self, company: &str) -> Option<&TierOverride> {
        self.overrides.get(&override_key(company))
    }

    /// Record a manual tier for a company, replacing any earlier one
    pub fn set(&mut self, company: &str, tier: Tier, justification: Option<String>) {
        let entry = TierOverride {
            tier_id: tier.id,
            justification,
            overridden_at: Utc::now(),
        };
        self.overrides.insert(override_key(company), entry);
    }

    /// Remove a company's override. Returns true if one existed.
    pub fn clear(&mut self, company: &str) -> bool {
        self.overrides.remove(&override_key(company)).is_some()
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::TIERS;

    #[test]
    fn test_new_state_is_empty() {
        let state = OverrideState::new();
        assert_eq!(state.version, 1);
        assert!(state.is_empty());
    }

    #[test]
    fn test_set_and_get_ignore_case() {
        let mut state = OverrideState::new();
        state.set("Acme Corp", TIERS[0], Some("Board-level sponsor".to_string()));

        let entry = state.get("  acme corp").unwrap();
        assert_eq!(entry.tier_id, 1);
        assert_eq!(entry.tier().unwrap().name, TIERS[0].name);
        assert_eq!(entry.justification.as_deref(), Some("Board-level sponsor"));
    }

    #[test]
    fn test_set_replaces_existing() {
        let mut state = OverrideState::new();
        state.set("Acme", TIERS[0], None);
        state.set("ACME", TIERS[2], None);
        assert_eq!(state.len(), 1);
        assert_eq!(state.get("acme").unwrap().tier_id, 3);
    }

    #[test]
    fn test_clear() {
        let mut state = OverrideState::new();
        state.set("Acme", TIERS[1], None);
        assert!(state.clear("acme"));
        assert!(!state.clear("acme"));
        assert!(state.get("Acme").is_none());
    }

    #[test]
    fn test_unknown_tier_id() {
        let entry = TierOverride {
            tier_id: 9,
            justification: None,
            overridden_at: Utc::now(),
        };
        assert!(entry.tier().is_none());
    }
}
