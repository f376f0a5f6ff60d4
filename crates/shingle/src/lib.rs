//! # Shingling (`shingle`)
//!
//! Turns token streams and raw text into sets of hashed k-shingles, the
//! element type the set-similarity index is usually fed with. Two documents
//! that share long runs of words end up sharing shingle hashes, so
//! containment and Jaccard over shingle sets measure textual overlap.
//!
//! Output is a pure function of `(input, ShingleConfig)`: equal inputs and
//! configs produce bit-identical hashes on every platform.
//!
//! ```
//! use shingle::{shingle_set, ShingleConfig};
//!
//! let cfg = ShingleConfig::default().with_k(2);
//! let a = shingle_set("the quick brown fox", &cfg).unwrap();
//! let b = shingle_set("The quick brown dog", &cfg).unwrap();
//! assert_eq!(a.len(), 3);
//! assert_eq!(a.iter().filter(|h| b.contains(h)).count(), 2);
//! ```

mod config;
mod rolling;

use rayon::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

pub use crate::config::{ShingleConfig, ShingleError};
pub use crate::rolling::shingle_tokens;

/// Split `text` into Unicode words and shingle them in order.
///
/// Punctuation and whitespace are dropped by word segmentation, so
/// `"fox, jumps"` and `"fox jumps"` produce the same shingles.
pub fn shingle_text(text: &str, cfg: &ShingleConfig) -> Result<Vec<u64>, ShingleError> {
    let words: Vec<&str> = text.unicode_words().collect();
    shingle_tokens(&words, cfg)
}

/// Distinct shingle hashes of `text`, sorted ascending.
pub fn shingle_set(text: &str, cfg: &ShingleConfig) -> Result<Vec<u64>, ShingleError> {
    let mut hashes = shingle_text(text, cfg)?;
    hashes.sort_unstable();
    hashes.dedup();
    Ok(hashes)
}

/// [`shingle_set`] over many documents on the rayon pool.
///
/// Results line up with the input order.
pub fn shingle_documents<D>(docs: &[D], cfg: &ShingleConfig) -> Vec<Result<Vec<u64>, ShingleError>>
where
    D: AsRef<str> + Sync,
{
    docs.par_iter()
        .map(|doc| shingle_set(doc.as_ref(), cfg))
        .collect()
}
