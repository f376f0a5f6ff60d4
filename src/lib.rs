//! Workspace umbrella crate for setmatch, exact set-similarity search.
//!
//! Re-exports the index, matcher and shingling crates and stitches them
//! together so callers can index raw text documents and look for overlapping
//! ones with a single API entry point.
//!
//! ```
//! use setmatch::{index_documents, find_pairs, SetMatchConfig};
//!
//! let cfg = SetMatchConfig::default();
//! let docs = [
//!     ("a", "the quick brown fox jumps over the lazy dog"),
//!     ("b", "the quick brown fox jumps over the sleepy cat"),
//!     ("c", "an entirely unrelated sentence about sailing boats"),
//! ];
//! let matcher = index_documents(docs, &cfg.shingle_config(), cfg.index_config()).unwrap();
//!
//! let pairs = find_pairs(&matcher, &cfg.matcher).unwrap();
//! let linked: Vec<_> = pairs.iter().map(|p| (p.query.as_str(), p.hit.id.as_str())).collect();
//! assert!(linked.contains(&("a", "b")));
//! assert!(linked.iter().all(|(q, m)| *q != "c" && *m != "c"));
//! ```

pub mod config;

pub use crate::config::{
    ConfigLoadError, IndexYamlConfig, MatchYamlConfig, SetMatchConfig, ShingleYamlConfig,
};
pub use index::{Candidates, IndexConfig, IndexError, Item, SetIndex, SizePolicy, Slot};
pub use matcher::{
    set_match_metrics, Bound, MatchConfig, MatchError, MatchHit, MatchMetrics, Matcher, Matches,
    PairHit, QueryKind, SharedMatcher, Tagged,
};
pub use shingle::{
    shingle_documents, shingle_set, shingle_text, shingle_tokens, ShingleConfig, ShingleError,
};

use std::error::Error;
use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, info};

/// Errors that can occur while turning documents into matches.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    Shingle { id: String, source: ShingleError },
    Match(MatchError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Shingle { id, source } => {
                write!(f, "shingling failed for document {id}: {source}")
            }
            PipelineError::Match(err) => write!(f, "matching failed: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Shingle { source, .. } => Some(source),
            PipelineError::Match(err) => Some(err),
        }
    }
}

impl From<MatchError> for PipelineError {
    fn from(value: MatchError) -> Self {
        PipelineError::Match(value)
    }
}

/// Shingle `(id, text)` documents on the rayon pool and index them in input
/// order.
///
/// Fails on the first document that cannot be shingled (too few words for
/// `k`) or whose id is already taken. No partially built matcher is returned.
pub fn index_documents<I, K, D>(
    docs: I,
    shingle_cfg: &ShingleConfig,
    index_cfg: IndexConfig,
) -> Result<Matcher<String, u64>, PipelineError>
where
    I: IntoIterator<Item = (K, D)>,
    K: Into<String>,
    D: AsRef<str> + Sync,
{
    let (ids, texts): (Vec<String>, Vec<D>) = docs
        .into_iter()
        .map(|(id, text)| (id.into(), text))
        .unzip();
    let sets = shingle_documents(&texts, shingle_cfg);

    let mut matcher = Matcher::with_config(index_cfg);
    for (id, set) in ids.into_iter().zip(sets) {
        let set = set.map_err(|source| PipelineError::Shingle {
            id: id.clone(),
            source,
        })?;
        matcher.add(id, set)?;
    }
    info!(documents = matcher.len(), "indexed documents");
    Ok(matcher)
}

/// Shingle `text` and query the matcher with it.
pub fn match_text(
    matcher: &Matcher<String, u64>,
    text: &str,
    shingle_cfg: &ShingleConfig,
    cfg: &MatchConfig,
) -> Result<Vec<MatchHit<String>>, PipelineError> {
    let set = shingle_set(text, shingle_cfg).map_err(|source| PipelineError::Shingle {
        id: "<query>".to_string(),
        source,
    })?;
    let hits: Vec<_> = matcher
        .by_item(&set, cfg, None::<&str>)?
        .map(MatchHit::cloned)
        .collect();
    debug!(shingles = set.len(), hits = hits.len(), "matched text");
    Ok(hits)
}

/// All-pairs comparison driven by the `matcher` config section.
///
/// Uses the rayon pool when `parallel` is set; hit order is then unspecified.
pub fn find_pairs<K, E>(
    matcher: &Matcher<K, E>,
    cfg: &MatchYamlConfig,
) -> Result<Vec<PairHit<K, K>>, MatchError>
where
    K: Eq + Hash + Clone + Debug + Sync,
    E: Eq + Hash + Clone + Sync,
{
    let match_cfg = cfg.to_match_config();
    let pairs: Vec<_> = if cfg.parallel {
        matcher
            .par_pairwise(&match_cfg, cfg.self_loops)?
            .into_iter()
            .map(PairHit::cloned)
            .collect()
    } else {
        matcher
            .pairwise(&match_cfg, cfg.self_loops)?
            .map(PairHit::cloned)
            .collect()
    };
    debug!(
        items = matcher.len(),
        pairs = pairs.len(),
        parallel = cfg.parallel,
        "pairwise run complete"
    );
    Ok(pairs)
}
