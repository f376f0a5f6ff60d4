//! YAML configuration for setmatch.
//!
//! One file configures the index, the default match filters and the
//! shingler. Every section is optional and falls back to the crate defaults.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "near-duplicate docs"
//!
//! index:
//!   size_policy: distinct   # or "supplied"
//!   capacity: 10000
//!
//! matcher:
//!   cmin: 2        # integer: at least two shared elements
//!   cmax: 1.0      # real: containment ratio
//!   jaccard: true
//!   jmin: 0.3
//!   jmax: 1.0
//!   self_loops: false
//!   parallel: true
//!
//! shingle:
//!   k: 3
//!   seed: 17297687000019483309
//!   lowercase: true
//! ```
//!
//! `cmin` and `cmax` keep the literal's type: an integer is a count of shared
//! elements, a real number is a containment fraction. `1` and `1.0` therefore
//! mean different things.

use std::fs;
use std::path::Path;

use index::{IndexConfig, SizePolicy};
use matcher::{Bound, MatchConfig};
use serde::{Deserialize, Serialize};
use shingle::ShingleConfig;
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SetMatchConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub index: IndexYamlConfig,

    #[serde(default)]
    pub matcher: MatchYamlConfig,

    #[serde(default)]
    pub shingle: ShingleYamlConfig,
}

impl SetMatchConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: SetMatchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.index.validate()?;
        self.matcher.validate()?;
        self.shingle.validate()?;
        Ok(())
    }

    pub fn index_config(&self) -> IndexConfig {
        self.index.to_index_config()
    }

    pub fn match_config(&self) -> MatchConfig {
        self.matcher.to_match_config()
    }

    pub fn shingle_config(&self) -> ShingleConfig {
        self.shingle.to_shingle_config()
    }
}

impl Default for SetMatchConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            index: IndexYamlConfig::default(),
            matcher: MatchYamlConfig::default(),
            shingle: ShingleYamlConfig::default(),
        }
    }
}

/// Index YAML configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexYamlConfig {
    #[serde(default)]
    pub size_policy: SizePolicy,

    /// Expected number of items; only used to pre-size storage.
    #[serde(default)]
    pub capacity: usize,
}

impl IndexYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if u32::try_from(self.capacity).is_err() {
            return Err(ConfigLoadError::Validation(format!(
                "index.capacity must not exceed {}",
                u32::MAX
            )));
        }
        Ok(())
    }

    pub fn to_index_config(&self) -> IndexConfig {
        IndexConfig::new()
            .with_size_policy(self.size_policy)
            .with_capacity(self.capacity)
    }
}

/// Matcher YAML configuration: default filters plus pairwise options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchYamlConfig {
    #[serde(default = "default_cmin")]
    pub cmin: Bound,

    #[serde(default = "default_cmax")]
    pub cmax: Bound,

    #[serde(default = "true_value")]
    pub jaccard: bool,

    #[serde(default)]
    pub jmin: f64,

    #[serde(default = "default_jmax")]
    pub jmax: f64,

    /// Report each item as matching itself in pairwise runs.
    #[serde(default)]
    pub self_loops: bool,

    /// Run pairwise comparisons on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
}

impl MatchYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        self.to_match_config()
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("matcher: {err}")))?;
        if self.jaccard && self.jmin > self.jmax {
            return Err(ConfigLoadError::Validation(format!(
                "matcher.jmin ({}) must not exceed matcher.jmax ({})",
                self.jmin, self.jmax
            )));
        }
        Ok(())
    }

    pub fn to_match_config(&self) -> MatchConfig {
        let cfg = MatchConfig::new()
            .with_containment_min(self.cmin)
            .with_containment_max(self.cmax);
        if self.jaccard {
            cfg.with_jaccard_range(self.jmin, self.jmax)
        } else {
            cfg.with_jaccard(false)
        }
    }
}

impl Default for MatchYamlConfig {
    fn default() -> Self {
        Self {
            cmin: default_cmin(),
            cmax: default_cmax(),
            jaccard: true,
            jmin: 0.0,
            jmax: default_jmax(),
            self_loops: false,
            parallel: false,
        }
    }
}

/// Shingling YAML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShingleYamlConfig {
    #[serde(default = "default_k")]
    pub k: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "true_value")]
    pub lowercase: bool,
}

impl ShingleYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        self.to_shingle_config()
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("shingle: {err}")))
    }

    pub fn to_shingle_config(&self) -> ShingleConfig {
        ShingleConfig::new()
            .with_k(self.k)
            .with_seed(self.seed)
            .with_lowercase(self.lowercase)
    }
}

impl Default for ShingleYamlConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            seed: default_seed(),
            lowercase: true,
        }
    }
}

fn default_cmin() -> Bound {
    MatchConfig::default().containment_min
}

fn default_cmax() -> Bound {
    MatchConfig::default().containment_max
}

fn default_jmax() -> f64 {
    1.0
}

fn default_k() -> usize {
    ShingleConfig::default().k
}

fn default_seed() -> u64 {
    ShingleConfig::default().seed
}

fn true_value() -> bool {
    true
}
