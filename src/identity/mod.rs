use chrono::NaiveDate;
use sha2::{Digest, Sha256};

pub const DEFAULT_NAMESPACE: &str = "LG_AD_2026_STEP1_";
const DIGEST_CHARS: usize = 10;

/// Derives reproducible project identifiers under a fixed namespace tag.
#[derive(Debug, Clone)]
pub struct ProjectIdGenerator {
    namespace: String,
}

impl Default for ProjectIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl ProjectIdGenerator {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into() }
    }

    /// `region|city|seed|YYYYMMDD` hashed, first ten hex digits upper-cased.
    /// The date must be the UTC calendar day.
    pub fn generate(&self, region: &str, city: &str, seed_text: &str, now_utc_date: NaiveDate) -> String {
        let raw = format!("{}|{}|{}|{}", region, city, seed_text, now_utc_date.format("%Y%m%d"));
        let hash = Sha256::digest(raw.as_bytes());
        let hex = format!("{hash:x}");
        format!("{}{}", self.namespace, hex[..DIGEST_CHARS].to_ascii_uppercase())
    }
}

/// Seed text from the concept fields, as the CLI feeds it to the generator.
/// Empty when both fields are blank.
pub fn seed_from_concept(concept: &str, concept_summary: &str) -> String {
    if concept.trim().is_empty() && concept_summary.trim().is_empty() {
        return String::new();
    }
    format!("{}|{}", concept, concept_summary).trim().to_string()
}
