//! # Set Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` sits on top of the inverted index (`index`) and turns raw
//! candidate counts into scored, filtered hits. Given a query set it reports
//! every stored item whose *containment* of the query and, optionally, whose
//! *Jaccard similarity* with the query fall inside configured bounds.
//!
//! - containment = shared / |query|
//! - jaccard = shared / (|query| + |item| - shared)
//!
//! How `|x|` is measured (elements as supplied, or distinct elements) is an
//! index-level [`index::SizePolicy`].
//!
//! ## Core Types
//!
//! - [`Matcher`]: owns a [`index::SetIndex`] and exposes the query entry points
//!   `by_id`, `by_item`, `pairwise`, `pairwise_with` and `par_pairwise`.
//! - [`MatchConfig`]: containment bounds ([`Bound::Count`] compares shared
//!   elements, [`Bound::Fraction`] compares the containment ratio) plus the
//!   Jaccard toggle and range.
//! - [`Matches`]: lazy iterator of [`MatchHit`]s for one query.
//! - [`PairHit`]: a hit prefixed with the identifier of the query item.
//! - [`SharedMatcher`]: `Arc<RwLock<..>>` handle for concurrent use.
//!
//! ## Example Usage
//!
//! ```
//! use matcher::{MatchConfig, Matcher};
//!
//! let mut matcher = Matcher::new();
//! matcher.add("a", [1u32, 2, 3]).unwrap();
//! matcher.add("b", [2u32, 3, 4]).unwrap();
//! matcher.add("c", [5u32, 6]).unwrap();
//!
//! let cfg = MatchConfig::default();
//! let hits: Vec<_> = matcher.by_id("a", &cfg, Some("a")).unwrap().collect();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(*hits[0].id, "b");
//! assert_eq!(hits[0].containment, 2.0 / 3.0);
//! assert_eq!(hits[0].jaccard, Some(0.5));
//! ```
//!
//! ## Observability
//!
//! Install a [`MatchMetrics`] implementation via [`set_match_metrics`] to record
//! insert outcomes and per-query retrieval latency. Query entry points also
//! emit `tracing` events at `debug` (single queries) and `trace` (per pairwise
//! item) level.

pub mod engine;
pub mod metrics;
pub mod pipeline;
pub mod shared;
pub mod types;

pub use crate::engine::Matcher;
pub use crate::metrics::{set_match_metrics, MatchMetrics};
pub use crate::pipeline::{Matches, Tagged};
pub use crate::shared::SharedMatcher;
pub use crate::types::{Bound, MatchConfig, MatchError, MatchHit, PairHit, QueryKind};
