use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest weight a single criterion may carry.
pub const MAX_WEIGHT: u32 = 100;

/// One weighted scoring dimension.
///
/// Example YAML:
/// ```yaml
/// - id: employees
///   name: Employee Count
///   weight: 15
///   enabled: true
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Criterion {
    /// Stable key, matched against account field names
    pub id: String,

    /// Display label
    #[serde(default)]
    pub name: String,

    /// 0-100, only counted while enabled
    pub weight: u32,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Criterion {
    pub fn new(id: &str, name: &str, weight: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            weight,
            enabled: true,
        }
    }

    /// Display label, or the id when no name was configured
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Built-in criteria, summing to 100.
pub fn default_criteria() -> Vec<Criterion> {
    vec![
        Criterion::new("employees", "Employee Count", 15),
        Criterion::new("revenue", "Annual Revenue", 20),
        Criterion::new("industryGrowth", "Industry Growth", 15),
        Criterion::new("govInvestment", "Government Investment", 10),
        Criterion::new("businessActivity", "Business Activity", 10),
        Criterion::new("hiringTrends", "Hiring Trends", 10),
        Criterion::new("techAdoption", "Technology Adoption", 10),
        Criterion::new("tariffExposure", "Tariff Exposure", 10),
    ]
}

#[derive(Debug, PartialEq, Eq)]
pub enum RegistryError {
    UnknownCriterion(String),
    WeightOutOfRange { id: String, weight: u32 },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::UnknownCriterion(id) => write!(f, "Unknown criterion '{}'", id),
            RegistryError::WeightOutOfRange { id, weight } => write!(
                f,
                "Weight {} for '{}' is out of range (0-{})",
                weight, id, MAX_WEIGHT
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Ordered, run-time editable list of criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriteriaRegistry {
    criteria: Vec<Criterion>,
}

impl Default for CriteriaRegistry {
    fn default() -> Self {
        Self::new(default_criteria())
    }
}

impl CriteriaRegistry {
    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }

    pub fn as_slice(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter().filter(|c| c.enabled)
    }

    pub fn get(&self, id: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Criterion, RegistryError> {
        self.criteria
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RegistryError::UnknownCriterion(id.to_string()))
    }

    pub fn set_weight(&mut self, id: &str, weight: u32) -> Result<(), RegistryError> {
        if weight > MAX_WEIGHT {
            return Err(RegistryError::WeightOutOfRange {
                id: id.to_string(),
                weight,
            });
        }
        self.get_mut(id)?.weight = weight;
        Ok(())
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), RegistryError> {
        self.get_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// Sum of weights over enabled criteria
    pub fn enabled_weight_sum(&self) -> u64 {
        self.enabled().map(|c| u64::from(c.weight)).sum()
    }

    /// Whether the enabled weights add up to exactly 100
    pub fn is_balanced(&self) -> bool {
        self.enabled_weight_sum() == 100
    }

    /// Apply an override of the form "id=weight"
    pub fn apply_weight_arg(&mut self, arg: &str) -> anyhow::Result<()> {
        let (id, weight) = arg
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Expected id=weight, got '{}'", arg))?;
        let weight: u32 = weight
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid weight in '{}'", arg))?;
        self.set_weight(id.trim(), weight)?;
        Ok(())
    }
}
