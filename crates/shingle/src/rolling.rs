//! Rolling polynomial hash over per-token xxh3 hashes.
//!
//! Each window of `k` token hashes `t0..tk` maps to
//! `t0 * B^(k-1) + t1 * B^(k-2) + ... + tk`, with wrapping arithmetic and a
//! seed-dependent base `B`. Sliding the window costs O(1).

use std::borrow::Cow;

use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::config::{ShingleConfig, ShingleError};

const BASE: u64 = 1_000_003;

pub(crate) fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn token_hash(token: &str, cfg: &ShingleConfig) -> u64 {
    let token: Cow<'_, str> = if cfg.lowercase && token.chars().any(char::is_uppercase) {
        Cow::Owned(token.to_lowercase())
    } else {
        Cow::Borrowed(token)
    };
    xxh3_64_with_seed(token.as_bytes(), cfg.seed)
}

/// Hash every window of `cfg.k` consecutive tokens, in token order.
///
/// Returns `tokens.len() - k + 1` hashes; repeated windows hash equal.
pub fn shingle_tokens<S: AsRef<str>>(
    tokens: &[S],
    cfg: &ShingleConfig,
) -> Result<Vec<u64>, ShingleError> {
    cfg.validate()?;
    let k = cfg.k;
    if tokens.len() < k {
        return Err(ShingleError::NotEnoughTokens {
            k,
            got: tokens.len(),
        });
    }

    let hashes: Vec<u64> = tokens
        .iter()
        .map(|t| token_hash(t.as_ref(), cfg))
        .collect();

    let base = BASE ^ splitmix64(cfg.seed);
    // weight of the token leaving the window
    let leading = (1..k).fold(1u64, |acc, _| acc.wrapping_mul(base));

    let mut window = hashes[..k]
        .iter()
        .fold(0u64, |h, &t| h.wrapping_mul(base).wrapping_add(t));
    let mut out = Vec::with_capacity(hashes.len() - k + 1);
    out.push(window);

    for (&leaving, &entering) in hashes.iter().zip(&hashes[k..]) {
        window = window
            .wrapping_sub(leaving.wrapping_mul(leading))
            .wrapping_mul(base)
            .wrapping_add(entering);
        out.push(window);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct(tokens: &[&str], cfg: &ShingleConfig) -> Vec<u64> {
        let base = BASE ^ splitmix64(cfg.seed);
        tokens
            .windows(cfg.k)
            .map(|w| {
                w.iter().fold(0u64, |h, t| {
                    h.wrapping_mul(base).wrapping_add(token_hash(t, cfg))
                })
            })
            .collect()
    }

    #[test]
    fn rolling_matches_direct_windows() {
        let tokens = ["the", "quick", "brown", "fox", "jumps", "over", "the", "dog"];
        for k in 1..=tokens.len() {
            let cfg = ShingleConfig::default().with_k(k);
            assert_eq!(shingle_tokens(&tokens, &cfg).unwrap(), direct(&tokens, &cfg), "k={k}");
        }
    }

    #[test]
    fn window_count() {
        let tokens: Vec<String> = (0..1000).map(|i| format!("token{i}")).collect();
        let cfg = ShingleConfig::default().with_k(100);
        assert_eq!(shingle_tokens(&tokens, &cfg).unwrap().len(), 901);
    }

    #[test]
    fn too_few_tokens() {
        let cfg = ShingleConfig::default().with_k(3);
        assert_eq!(
            shingle_tokens(&["a", "b"], &cfg),
            Err(ShingleError::NotEnoughTokens { k: 3, got: 2 })
        );
    }

    #[test]
    fn seed_and_order_change_hashes() {
        let cfg = ShingleConfig::default().with_k(2);
        let a = shingle_tokens(&["the", "quick", "brown"], &cfg).unwrap();
        let b = shingle_tokens(&["brown", "quick", "the"], &cfg).unwrap();
        let c = shingle_tokens(&["the", "quick", "brown"], &cfg.with_seed(7)).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn case_folding_is_optional() {
        let cfg = ShingleConfig::default().with_k(2);
        let lower = shingle_tokens(&["hello", "world"], &cfg).unwrap();
        let upper = shingle_tokens(&["Hello", "WORLD"], &cfg).unwrap();
        assert_eq!(lower, upper);

        let cfg = cfg.with_lowercase(false);
        let lower = shingle_tokens(&["hello", "world"], &cfg).unwrap();
        let upper = shingle_tokens(&["Hello", "WORLD"], &cfg).unwrap();
        assert_ne!(lower, upper);
    }
}
