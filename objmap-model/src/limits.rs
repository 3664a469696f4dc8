//! Resource limits for parsing untrusted input

use crate::error::{MapperError, Result};

/// Limits applied while materializing a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of simultaneously open aggregates (default: 128, hard: 1,024)
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_depth: 128 }
    }
}

impl Limits {
    /// Hard maximum limits that cannot be exceeded
    ///
    /// The scanner recurses once per open aggregate, so the depth ceiling
    /// also bounds its stack use.
    pub fn hard_maximums() -> Self {
        Self { max_depth: 1_024 }
    }

    /// Validate limits against hard maximums
    pub fn validate(&self) -> Result<()> {
        let hard = Self::hard_maximums();

        if self.max_depth == 0 {
            return Err(MapperError::LimitExceeded(
                "max_depth must be at least 1".to_string(),
            ));
        }

        if self.max_depth > hard.max_depth {
            return Err(MapperError::LimitExceeded(format!(
                "max_depth {} exceeds hard limit {}",
                self.max_depth, hard.max_depth
            )));
        }

        Ok(())
    }
}
