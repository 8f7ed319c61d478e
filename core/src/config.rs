use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum cosine similarity (exclusive) for a document to be returned.
    pub similarity_threshold: f64,
    /// Lowercase tokens of documents and queries. Off by default, so "The" and "the" are distinct terms.
    pub case_fold: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD, case_fold: false }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.similarity_threshold.is_finite() {
            return Err(SearchError::InvalidInput(format!(
                "similarity threshold must be finite, got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}
