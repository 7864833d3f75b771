pub mod storage;
pub mod types;

pub use storage::{get_overrides_path, load_overrides, save_overrides};
pub use types::{override_key, OverrideState, TierOverride};

use crate::account::ScoredAccount;

/// Apply stored manual tiers to a scored batch. Returns how many accounts changed.
///
/// The computed `tierScore` is kept; only tier and justification move.
/// Entries with an unknown tier id are skipped with a warning.
pub fn apply_overrides(accounts: &mut [ScoredAccount], state: &OverrideState) -> usize {
    if state.is_empty() {
        return 0;
    }

    let mut applied = 0;
    for account in accounts.iter_mut() {
        let Some(company) = account.account.company_name() else {
            continue;
        };
        let Some(entry) = state.get(company) else {
            continue;
        };
        match entry.tier() {
            Some(tier) => {
                log::debug!("Manual override for {}: {}", company, tier.name);
                account.override_tier(tier, entry.justification.clone());
                applied += 1;
            }
            None => log::warn!(
                "Ignoring override for {}: unknown tier id {}",
                company,
                entry.tier_id
            ),
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountRecord;
    use crate::scoring::{classify, TIERS};
    use chrono::Utc;

    fn scored(company: &str, score: u8) -> ScoredAccount {
        let record: AccountRecord = [("company", company)].into_iter().collect();
        ScoredAccount::scored(record, score, classify(score), None, Vec::new())
    }

    #[test]
    fn test_apply_overrides() {
        let mut accounts = vec![scored("Acme", 40), scored("Globex", 90)];
        let mut state = OverrideState::new();
        state.set("ACME", TIERS[0], Some("Strategic account".to_string()));

        assert_eq!(apply_overrides(&mut accounts, &state), 1);
        assert_eq!(accounts[0].tier.id, 1);
        assert_eq!(accounts[0].tier_score(), 40);
        assert!(accounts[0].manual_override);
        assert!(!accounts[1].manual_override);
    }

    #[test]
    fn test_apply_skips_unknown_tier() {
        let mut accounts = vec![scored("Acme", 40)];
        let mut state = OverrideState::new();
        state.overrides.insert(
            "acme".to_string(),
            TierOverride {
                tier_id: 7,
                justification: None,
                overridden_at: Utc::now(),
            },
        );

        assert_eq!(apply_overrides(&mut accounts, &state), 0);
        assert_eq!(accounts[0].tier.id, 3);
    }

    #[test]
    fn test_apply_to_failed_account() {
        let record: AccountRecord = [("company", "Initech")].into_iter().collect();
        let mut accounts = vec![ScoredAccount::failed(record, "timeout".to_string())];
        let mut state = OverrideState::new();
        state.set("initech", TIERS[1], None);

        assert_eq!(apply_overrides(&mut accounts, &state), 1);
        assert_eq!(accounts[0].tier.id, 2);
        assert_eq!(accounts[0].tier_score(), 0);
    }
}
