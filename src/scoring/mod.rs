pub mod criteria;
pub mod engine;
pub mod normalize;
pub mod tier;
pub mod validation;

pub use criteria::{default_criteria, CriteriaRegistry, Criterion, RegistryError, MAX_WEIGHT};
pub use engine::{calculate_score, score, CriterionScore, ScoreResult};
pub use normalize::{categorical_score, extract_number, normalize};
pub use tier::{classify, Tier, TIERS};
pub use validation::validate_criteria;
