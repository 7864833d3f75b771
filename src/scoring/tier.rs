use serde::Serialize;

/// A fixed sales-priority bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tier {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    /// Display color as a hex string
    pub color: &'static str,
    /// Lowest composite score that lands in this tier
    #[serde(skip)]
    pub min_score: u8,
}

pub const TIER_1: Tier = Tier {
    id: 1,
    name: "Tier 1",
    description: "Top 5-10% of accounts, strong across all signals",
    color: "#16a34a",
    min_score: 85,
};

pub const TIER_2: Tier = Tier {
    id: 2,
    name: "Tier 2",
    description: "High potential, missing one or two Tier 1 indicators",
    color: "#2563eb",
    min_score: 65,
};

pub const TIER_3: Tier = Tier {
    id: 3,
    name: "Tier 3",
    description: "Moderate signal, candidate for quick wins",
    color: "#d97706",
    min_score: 35,
};

pub const TIER_4: Tier = Tier {
    id: 4,
    name: "Tier 4",
    description: "Invalid or low potential",
    color: "#dc2626",
    min_score: 0,
};

/// All tiers, best first
pub const TIERS: [Tier; 4] = [TIER_1, TIER_2, TIER_3, TIER_4];

impl Tier {
    pub fn from_id(id: u8) -> Option<Tier> {
        TIERS.iter().copied().find(|t| t.id == id)
    }

    pub fn lowest() -> Tier {
        TIER_4
    }
}

/// Map a composite score to its tier. Each band includes its lower bound.
pub fn classify(score: u8) -> Tier {
    TIERS
        .iter()
        .copied()
        .find(|t| score >= t.min_score)
        .unwrap_or(TIER_4)
}
