//! Normalization of free-text product and ingredient names.
//!
//! Every function here is pure: cleaned keys, dosage-free names, salt-free
//! ingredient bases, and ingredient group keys depend only on their inputs.

pub mod cleaner;
pub mod dosage;
pub mod group;
pub mod salts;
pub mod script;

pub use cleaner::{Cleaner, DEFAULT_ARTIFACT_TOKENS, clean};
pub use dosage::strip_dosage;
pub use group::{CrossReference, group_key, normalize_ingredient_eng, normalize_ingredient_kor};
pub use salts::{ENGLISH_SALTS, KOREAN_SALTS, SaltLanguage, SaltList, strip_salts};
pub use script::{collapse_whitespace, contains_hangul, is_hangul_syllable};
