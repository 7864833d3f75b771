pub mod scored;
pub mod types;

pub use scored::ScoredAccount;
pub use types::{AccountRecord, FieldValue, KNOWN_CRITERION_KEYS};
