use super::criteria::Criterion;
use super::normalize::{normalize, MAX_SUB_SCORE};
use crate::account::AccountRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct CriterionScore {
    pub id: String,
    pub label: String,
    pub value: Option<String>, // raw field value, if present
    pub sub_score: u8,         // 0-10
    pub weight: u32,
    pub contribution: f64, // sub_score / 10 * weight
}

#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub score: u8,
    pub total: f64,         // sum of weighted contributions
    pub possible: u64,      // sum of enabled weights
    pub breakdown: Vec<CriterionScore>,
}

/// Composite 0-100 score for an account over the enabled criteria.
pub fn score(account: &AccountRecord, criteria: &[Criterion]) -> u8 {
    calculate_score(account, criteria).score
}

pub fn calculate_score(account: &AccountRecord, criteria: &[Criterion]) -> ScoreResult {
    let mut breakdown = Vec::new();
    // Weighted contributions in tenths of a point, so rounding stays exact
    let mut total_tenths: u64 = 0;
    let mut possible: u64 = 0;

    for criterion in criteria.iter().filter(|c| c.enabled) {
        let value = account.get(&criterion.id);
        let sub_score = normalize(value, criterion);
        total_tenths += u64::from(sub_score) * u64::from(criterion.weight);
        possible += u64::from(criterion.weight);

        breakdown.push(CriterionScore {
            id: criterion.id.clone(),
            label: criterion.label().to_string(),
            value: value.map(|v| v.to_string()),
            sub_score,
            weight: criterion.weight,
            contribution: f64::from(sub_score) * f64::from(criterion.weight)
                / f64::from(MAX_SUB_SCORE),
        });
    }

    let score = if possible == 0 {
        0
    } else {
        // round(total / possible * 100) with halves rounded up:
        // total = tenths / 10, so the ratio is tenths * 10 / possible
        let numerator = total_tenths * 10;
        let denominator = possible;
        ((2 * numerator + denominator) / (2 * denominator)).min(100) as u8
    };

    ScoreResult {
        score,
        total: total_tenths as f64 / f64::from(MAX_SUB_SCORE),
        possible,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::classify;

    fn two_criteria() -> Vec<Criterion> {
        vec![
            Criterion::new("employees", "Employee Count", 50),
            Criterion::new("revenue", "Annual Revenue", 50),
        ]
    }

    fn account(fields: &[(&str, &str)]) -> AccountRecord {
        fields.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_strong_account_scores_full() {
        let acct = account(&[("company", "Acme"), ("employees", "12000"), ("revenue", "$2B")]);
        let result = calculate_score(&acct, &two_criteria());

        let subs: Vec<u8> = result.breakdown.iter().map(|c| c.sub_score).collect();
        assert_eq!(subs, vec![10, 10]);
        assert_eq!(result.total, 100.0);
        assert_eq!(result.possible, 100);
        assert_eq!(result.score, 100);
        assert_eq!(classify(result.score).id, 1);
    }

    #[test]
    fn test_unknown_account_scores_zero() {
        let acct = account(&[("employees", "Unknown"), ("revenue", "Unknown")]);
        let result = calculate_score(&acct, &two_criteria());
        assert_eq!(result.score, 0);
        assert_eq!(classify(result.score).id, 4);
    }

    #[test]
    fn test_all_disabled_scores_zero() {
        let mut criteria = two_criteria();
        for c in &mut criteria {
            c.enabled = false;
        }
        let acct = account(&[("employees", "12000"), ("revenue", "$2B")]);
        let result = calculate_score(&acct, &criteria);
        assert_eq!(result.score, 0);
        assert_eq!(result.possible, 0);
        assert!(result.breakdown.is_empty());
    }

    #[test]
    fn test_empty_criteria_scores_zero() {
        let acct = account(&[("employees", "12000")]);
        assert_eq!(score(&acct, &[]), 0);
    }

    #[test]
    fn test_disabled_criterion_ignored() {
        let mut criteria = two_criteria();
        criteria[1].enabled = false;
        // revenue would score 0, but it is disabled so employees alone counts
        let acct = account(&[("employees", "12000"), ("revenue", "Unknown")]);
        assert_eq!(score(&acct, &criteria), 100);
    }

    #[test]
    fn test_unbalanced_weights_normalised_against_actual_sum() {
        let criteria = vec![
            Criterion::new("employees", "Employees", 30),
            Criterion::new("hiringTrends", "Hiring", 30),
        ];
        // 10/10 * 30 + 3/10 * 30 = 39 of 60 -> 65
        let acct = account(&[("employees", "20000"), ("hiringTrends", "Low")]);
        assert_eq!(score(&acct, &criteria), 65);
    }

    #[test]
    fn test_rounds_half_up() {
        let criteria = vec![
            Criterion::new("industryGrowth", "Growth", 50),
            Criterion::new("techAdoption", "Tech", 50),
        ];
        // Neutral (5) + Unknown (0): 25 of 100 -> 25
        let acct = account(&[("industryGrowth", "Neutral"), ("techAdoption", "Unknown")]);
        assert_eq!(score(&acct, &criteria), 25);

        let criteria = vec![
            Criterion::new("industryGrowth", "Growth", 1),
            Criterion::new("techAdoption", "Tech", 1),
        ];
        // Neutral (0.5) + Low (0.3) = 0.8 of 2 -> 40
        let acct = account(&[("industryGrowth", "Neutral"), ("techAdoption", "Low")]);
        assert_eq!(score(&acct, &criteria), 40);

        let criteria = vec![
            Criterion::new("industryGrowth", "Growth", 8),
            Criterion::new("techAdoption", "Tech", 2),
        ];
        // Neutral (4.0) + Moderate (1.2) = 5.2 of 10 -> 52
        let acct = account(&[("industryGrowth", "Neutral"), ("techAdoption", "Moderate")]);
        assert_eq!(score(&acct, &criteria), 52);
    }

    #[test]
    fn test_exact_half_rounds_up() {
        let criteria = vec![
            Criterion::new("hiringTrends", "Hiring", 1),
            Criterion::new("techAdoption", "Tech", 1),
            Criterion::new("govInvestment", "Gov", 2),
        ];
        // Neutral on weight 1 = 0.5 of 4 -> 12.5 -> 13
        let acct = account(&[("hiringTrends", "Neutral")]);
        assert_eq!(score(&acct, &criteria), 13);
    }

    #[test]
    fn test_order_independent() {
        let acct = account(&[
            ("employees", "1,000-5,000"),
            ("revenue", "$60M"),
            ("hiringTrends", "Moderate"),
            ("techAdoption", "Strong"),
        ]);
        let criteria = crate::scoring::default_criteria();
        let mut reversed = criteria.clone();
        reversed.reverse();
        let mut rotated = criteria.clone();
        rotated.rotate_left(3);

        let expected = score(&acct, &criteria);
        assert_eq!(score(&acct, &reversed), expected);
        assert_eq!(score(&acct, &rotated), expected);
    }

    #[test]
    fn test_huge_weights_do_not_overflow() {
        let criteria = vec![
            Criterion::new("employees", "Employee Count", u32::MAX),
            Criterion::new("revenue", "Annual Revenue", 10),
        ];
        let acct = account(&[("employees", "12000")]);
        let result = calculate_score(&acct, &criteria);
        assert_eq!(result.possible, u64::from(u32::MAX) + 10);
        assert_eq!(result.score, 100);
        assert_eq!(result.breakdown[0].contribution, f64::from(u32::MAX));
    }

    #[test]
    fn test_breakdown_records_values() {
        let acct = account(&[("employees", "300")]);
        let result = calculate_score(&acct, &two_criteria());

        let employees = &result.breakdown[0];
        assert_eq!(employees.value.as_deref(), Some("300"));
        assert_eq!(employees.sub_score, 6);
        assert_eq!(employees.contribution, 30.0);

        let revenue = &result.breakdown[1];
        assert!(revenue.value.is_none());
        assert_eq!(revenue.sub_score, 0);
        assert_eq!(result.score, 30);
    }
}
