use std::collections::HashSet;

use super::criteria::{Criterion, MAX_WEIGHT};

/// Validate the criteria list before a batch is scored.
/// Returns all validation errors at once (not just the first).
///
/// The scorer itself copes with any weights; this is the gate callers use to
/// insist that enabled weights add up to 100.
pub fn validate_criteria(criteria: &[Criterion]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, criterion) in criteria.iter().enumerate() {
        if criterion.id.trim().is_empty() {
            errors.push(format!("criteria[{}].id: must not be empty", i));
        } else if !seen.insert(criterion.id.as_str()) {
            errors.push(format!(
                "criteria[{}].id: duplicate criterion '{}'",
                i, criterion.id
            ));
        }

        if criterion.weight > MAX_WEIGHT {
            errors.push(format!(
                "criteria[{}].weight: {} exceeds {}",
                i, criterion.weight, MAX_WEIGHT
            ));
        }
    }

    let enabled: Vec<_> = criteria.iter().filter(|c| c.enabled).collect();
    if enabled.is_empty() {
        errors.push("criteria: at least one criterion must be enabled".to_string());
    } else {
        let sum: u64 = enabled.iter().map(|c| u64::from(c.weight)).sum();
        if sum != 100 {
            errors.push(format!(
                "criteria: enabled weights sum to {}%, expected 100%",
                sum
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::default_criteria;

    #[test]
    fn test_default_criteria_valid() {
        assert!(validate_criteria(&default_criteria()).is_ok());
    }

    #[test]
    fn test_disabled_weights_excluded_from_sum() {
        let mut criteria = default_criteria();
        criteria.push(Criterion {
            id: "custom".to_string(),
            name: "Custom".to_string(),
            weight: 40,
            enabled: false,
        });
        assert!(validate_criteria(&criteria).is_ok());
    }

    #[test]
    fn test_unbalanced_sum() {
        let mut criteria = default_criteria();
        criteria[0].weight = 5;
        let errors = validate_criteria(&criteria).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("sum to 90%"));
    }

    #[test]
    fn test_none_enabled() {
        let mut criteria = default_criteria();
        for c in &mut criteria {
            c.enabled = false;
        }
        let errors = validate_criteria(&criteria).unwrap_err();
        assert!(errors[0].contains("at least one criterion"));
    }

    #[test]
    fn test_collects_all_errors() {
        let criteria = vec![
            Criterion::new("employees", "Employees", 150), // Error 1, and sum
            Criterion::new("employees", "Again", 0),       // Error 2
            Criterion::new(" ", "Blank", 0),               // Error 3
        ];
        let errors = validate_criteria(&criteria).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("criteria[0].weight"));
        assert!(errors[1].contains("criteria[1].id: duplicate"));
        assert!(errors[2].contains("criteria[2].id: must not be empty"));
        assert!(errors[3].contains("sum to 150%"));
    }

    #[test]
    fn test_huge_weights_reported_not_summed_into_overflow() {
        let criteria = vec![
            Criterion::new("employees", "Employees", u32::MAX),
            Criterion::new("revenue", "Revenue", u32::MAX),
        ];
        let errors = validate_criteria(&criteria).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("criteria[0].weight"));
        assert!(errors[1].contains("criteria[1].weight"));
        assert!(errors[2].contains(&format!("sum to {}%", 2 * u64::from(u32::MAX))));
    }
}
