//! Configuration and error types for shingling.
//!
//! Shingling is a pure function of `(tokens, config)`: no I/O, no clocks and
//! no process-global state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How token streams are cut into hashed k-shingles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ShingleConfig {
    /// Number of consecutive tokens per shingle.
    pub k: usize,
    /// Hash seed. Equal seeds, tokens and `k` give bit-identical shingles.
    pub seed: u64,
    /// Lowercase tokens before hashing.
    pub lowercase: bool,
}

impl ShingleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shingle size. Smaller `k` tolerates more local edits.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    pub fn validate(&self) -> Result<(), ShingleError> {
        if self.k < 1 {
            return Err(ShingleError::InvalidConfigK { k: self.k });
        }
        Ok(())
    }
}

impl Default for ShingleConfig {
    fn default() -> Self {
        Self {
            k: 3,
            seed: 0xF00D_BAAD_F00D_BAAD,
            lowercase: true,
        }
    }
}

/// Errors returned while shingling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShingleError {
    #[error("not enough tokens for k={k} (got {got})")]
    NotEnoughTokens { k: usize, got: usize },

    #[error("invalid config: k must be >= 1 (got {k})")]
    InvalidConfigK { k: usize },
}
