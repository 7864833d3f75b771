use anyhow::Result;
use async_trait::async_trait;

use super::EnrichmentProvider;
use crate::account::{AccountRecord, KNOWN_CRITERION_KEYS};

const LEVELS: [&str; 4] = ["High", "Medium", "Low", "Unknown"];

const EMPLOYEE_RANGES: [&str; 8] = [
    "1-10",
    "11-50",
    "51-200",
    "201-500",
    "501-1,000",
    "1,001-5,000",
    "5,001-10,000",
    "10,001+",
];

const REVENUE_BANDS: [&str; 7] = [
    "$500K", "$2M", "$15M", "$60M", "$300M", "$750M", "$2B",
];

/// Offline stand-in for a real enrichment API.
///
/// Values are derived from a stable hash of the company name and URL, so the
/// same account always enriches the same way.
#[derive(Debug, Default, Clone)]
pub struct MockEnricher;

impl MockEnricher {
    pub fn new() -> Self {
        Self
    }

    fn generate(&self, account: &AccountRecord) -> AccountRecord {
        let seed_text = format!(
            "{}|{}",
            account.company_name().unwrap_or_default().to_lowercase(),
            account.url().unwrap_or_default().to_lowercase()
        );
        let seed = fnv1a(seed_text.as_bytes());

        let mut fields = AccountRecord::new();
        for (i, key) in KNOWN_CRITERION_KEYS.iter().enumerate() {
            // Different bits of the hash for each field
            let bits = seed.rotate_left((i as u32) * 7) as usize;
            let value = match *key {
                "employees" => EMPLOYEE_RANGES[bits % EMPLOYEE_RANGES.len()],
                "revenue" => REVENUE_BANDS[bits % REVENUE_BANDS.len()],
                _ => LEVELS[bits % LEVELS.len()],
            };
            fields.insert(*key, value);
        }
        fields.insert(
            "justification",
            format!(
                "Generated profile for {} (no live data source configured)",
                account.display_name()
            ),
        );
        fields
    }
}

#[async_trait]
impl EnrichmentProvider for MockEnricher {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn enrich(&self, account: &AccountRecord) -> Result<AccountRecord> {
        Ok(self.generate(account))
    }
}

/// 64-bit FNV-1a
pub(crate) fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}
