use std::fmt;

use index::IndexError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Inclusive bound on how much of a query a candidate must cover.
///
/// A `Count` bound is compared against the raw number of shared elements, a
/// `Fraction` bound against the containment ratio. The variant is always
/// chosen explicitly; integers convert into `Count` and floats into
/// `Fraction`, so `2u64.into()` and `2.0.into()` mean different things.
///
/// When deserialized, an integer literal becomes a `Count` and a real literal
/// (including `1.0`) becomes a `Fraction`. Negative integers are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Bound {
    Count(u64),
    Fraction(f64),
}

impl Bound {
    pub const fn count(shared: u64) -> Self {
        Bound::Count(shared)
    }

    pub const fn fraction(containment: f64) -> Self {
        Bound::Fraction(containment)
    }

    /// `true` when the candidate reaches this bound from below.
    #[inline]
    pub fn admits_min(&self, shared: usize, containment: f64) -> bool {
        match *self {
            Bound::Count(min) => shared as u64 >= min,
            Bound::Fraction(min) => containment >= min,
        }
    }

    /// `true` when the candidate stays within this bound from above.
    #[inline]
    pub fn admits_max(&self, shared: usize, containment: f64) -> bool {
        match *self {
            Bound::Count(max) => shared as u64 <= max,
            Bound::Fraction(max) => containment <= max,
        }
    }

    fn validate(&self, name: &str) -> Result<(), MatchError> {
        match self {
            Bound::Fraction(value) if value.is_nan() => Err(MatchError::InvalidConfig(format!(
                "{name} must not be NaN"
            ))),
            _ => Ok(()),
        }
    }
}

impl<'de> Deserialize<'de> for Bound {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BoundVisitor;

        impl<'de> Visitor<'de> for BoundVisitor {
            type Value = Bound;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a non-negative integer count or a real containment fraction")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Bound, E>
            where
                E: de::Error,
            {
                Ok(Bound::Count(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Bound, E>
            where
                E: de::Error,
            {
                u64::try_from(value).map(Bound::Count).map_err(|_| {
                    E::custom(format!(
                        "integer count bound must be non-negative, got {value}"
                    ))
                })
            }

            fn visit_f64<E>(self, value: f64) -> Result<Bound, E>
            where
                E: de::Error,
            {
                Ok(Bound::Fraction(value))
            }
        }

        deserializer.deserialize_any(BoundVisitor)
    }
}

impl From<u64> for Bound {
    fn from(value: u64) -> Self {
        Bound::Count(value)
    }
}

impl From<usize> for Bound {
    fn from(value: usize) -> Self {
        Bound::Count(value as u64)
    }
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Bound::Fraction(value)
    }
}

/// Which entry point issued a query; reported to metrics and traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    ById,
    ByItem,
    Pairwise,
}

/// Filtering configuration shared by every query entry point.
///
/// Defaults admit every candidate that shares at least one element and report
/// Jaccard similarity alongside containment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Lower containment bound (inclusive).
    #[serde(default = "MatchConfig::default_containment_min", alias = "cmin")]
    pub containment_min: Bound,
    /// Upper containment bound (inclusive).
    #[serde(default = "MatchConfig::default_containment_max", alias = "cmax")]
    pub containment_max: Bound,
    /// Whether to compute and filter on Jaccard similarity.
    #[serde(default = "MatchConfig::default_jaccard")]
    pub jaccard: bool,
    /// Lower Jaccard bound (inclusive). Ignored when `jaccard` is off.
    #[serde(default, alias = "jmin")]
    pub jaccard_min: f64,
    /// Upper Jaccard bound (inclusive). Ignored when `jaccard` is off.
    #[serde(default = "MatchConfig::default_jaccard_max", alias = "jmax")]
    pub jaccard_max: f64,
}

impl MatchConfig {
    pub(crate) fn default_containment_min() -> Bound {
        Bound::Fraction(0.0)
    }

    pub(crate) fn default_containment_max() -> Bound {
        Bound::Fraction(1.0)
    }

    pub(crate) fn default_jaccard() -> bool {
        true
    }

    pub(crate) fn default_jaccard_max() -> f64 {
        1.0
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_containment_min(mut self, min: impl Into<Bound>) -> Self {
        self.containment_min = min.into();
        self
    }

    pub fn with_containment_max(mut self, max: impl Into<Bound>) -> Self {
        self.containment_max = max.into();
        self
    }

    pub fn with_jaccard(mut self, jaccard: bool) -> Self {
        self.jaccard = jaccard;
        self
    }

    /// Enable Jaccard filtering with the given inclusive range.
    pub fn with_jaccard_range(mut self, min: f64, max: f64) -> Self {
        self.jaccard = true;
        self.jaccard_min = min;
        self.jaccard_max = max;
        self
    }

    /// Validate the configuration before running a query.
    pub fn validate(&self) -> Result<(), MatchError> {
        self.containment_min.validate("containment_min")?;
        self.containment_max.validate("containment_max")?;
        if self.jaccard_min.is_nan() || self.jaccard_max.is_nan() {
            return Err(MatchError::InvalidConfig(
                "jaccard bounds must not be NaN".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            containment_min: Self::default_containment_min(),
            containment_max: Self::default_containment_max(),
            jaccard: Self::default_jaccard(),
            jaccard_min: 0.0,
            jaccard_max: Self::default_jaccard_max(),
        }
    }
}

/// A single candidate that survived filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchHit<M> {
    /// Identifier of the matched item.
    pub id: M,
    /// Number of elements shared with the query.
    pub shared: usize,
    /// Fraction of the query covered by the matched item.
    pub containment: f64,
    /// Jaccard similarity, present only when enabled in the config.
    pub jaccard: Option<f64>,
}

impl<M> MatchHit<&M>
where
    M: Clone,
{
    /// Detach the hit from the index it borrows from.
    pub fn cloned(self) -> MatchHit<M> {
        MatchHit {
            id: self.id.clone(),
            shared: self.shared,
            containment: self.containment,
            jaccard: self.jaccard,
        }
    }
}

/// A hit prefixed with the identifier of the query that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairHit<Q, M> {
    pub query: Q,
    #[serde(flatten)]
    pub hit: MatchHit<M>,
}

impl<Q, M> PairHit<&Q, &M>
where
    Q: Clone,
    M: Clone,
{
    pub fn cloned(self) -> PairHit<Q, M> {
        PairHit {
            query: self.query.clone(),
            hit: self.hit.cloned(),
        }
    }
}

/// Errors produced by the matching layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    /// Invalid per-request configuration.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// The query set has no elements, so containment is undefined.
    #[error("query set is empty")]
    EmptyQuerySet,
    /// Index insert or lookup failed.
    #[error("index error: {0}")]
    Index(#[from] IndexError),
}
