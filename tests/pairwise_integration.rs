//! End-to-end: text documents -> shingle sets -> index -> pairwise matches.

use std::sync::Once;

use setmatch::{
    find_pairs, index_documents, match_text, Bound, MatchConfig, MatchYamlConfig, SetMatchConfig,
};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

const DOCS: [(&str, &str); 5] = [
    (
        "report-v1",
        "the quarterly report shows revenue growth in every region except the north",
    ),
    (
        "report-v2",
        "the quarterly report shows revenue growth in every region including the north",
    ),
    (
        "memo",
        "please remember to submit your expense forms before the end of the month",
    ),
    (
        "memo-fwd",
        "fwd: please remember to submit your expense forms before the end of the month",
    ),
    (
        "poem",
        "shall i compare thee to a summer's day thou art more lovely and more temperate",
    ),
];

fn config(yaml_matcher: &str) -> SetMatchConfig {
    let yaml = format!("version: \"1.0\"\nshingle:\n  k: 3\nmatcher:\n{yaml_matcher}");
    SetMatchConfig::from_yaml(&yaml).unwrap()
}

fn linked(cfg: &SetMatchConfig) -> Vec<(String, String)> {
    let matcher = index_documents(DOCS, &cfg.shingle_config(), cfg.index_config()).unwrap();
    let mut pairs: Vec<_> = find_pairs(&matcher, &cfg.matcher)
        .unwrap()
        .into_iter()
        .map(|p| (p.query, p.hit.id))
        .collect();
    pairs.sort();
    pairs
}

#[test]
fn near_duplicates_pair_up() {
    init_tracing();
    let cfg = config("  cmin: 0.5\n");
    assert_eq!(
        linked(&cfg),
        [
            ("memo".to_string(), "memo-fwd".to_string()),
            ("memo-fwd".to_string(), "memo".to_string()),
            ("report-v1".to_string(), "report-v2".to_string()),
            ("report-v2".to_string(), "report-v1".to_string()),
        ]
    );
}

#[test]
fn parallel_and_self_loop_options_apply() {
    init_tracing();
    let sequential = linked(&config("  cmin: 0.5\n"));
    let parallel = linked(&config("  cmin: 0.5\n  parallel: true\n"));
    assert_eq!(sequential, parallel);

    let with_loops = linked(&config("  cmin: 0.5\n  self_loops: true\n"));
    assert_eq!(with_loops.len(), sequential.len() + DOCS.len());
    for (id, _) in DOCS {
        assert!(with_loops.contains(&(id.to_string(), id.to_string())));
    }
}

#[test]
fn containment_is_directional_for_prefixed_copy() {
    init_tracing();
    let cfg = SetMatchConfig::default();
    let matcher = index_documents(DOCS, &cfg.shingle_config(), cfg.index_config()).unwrap();

    // "memo" is fully contained in "memo-fwd", but not the other way round.
    let from_memo = matcher
        .by_id("memo", &MatchConfig::default(), Some("memo"))
        .unwrap()
        .find(|h| h.id == "memo-fwd")
        .unwrap();
    let from_fwd = matcher
        .by_id("memo-fwd", &MatchConfig::default(), Some("memo-fwd"))
        .unwrap()
        .find(|h| h.id == "memo")
        .unwrap();
    assert_eq!(from_memo.containment, 1.0);
    assert!(from_fwd.containment < 1.0);
    assert_eq!(from_memo.jaccard, from_fwd.jaccard);
}

#[test]
fn count_bounds_work_end_to_end() {
    init_tracing();
    let cfg = SetMatchConfig::default();
    let matcher = index_documents(DOCS, &cfg.shingle_config(), cfg.index_config()).unwrap();

    let strict = MatchYamlConfig {
        cmin: Bound::Count(10),
        ..MatchYamlConfig::default()
    };
    let pairs = find_pairs(&matcher, &strict).unwrap();
    assert!(!pairs.is_empty());
    assert!(pairs.iter().all(|p| p.hit.shared >= 10));

    let hits = match_text(
        &matcher,
        "remember to submit your expense forms",
        &cfg.shingle_config(),
        &MatchConfig::default().with_containment_min(1.0),
    )
    .unwrap();
    let mut ids: Vec<_> = hits.into_iter().map(|h| h.id).collect();
    ids.sort();
    assert_eq!(ids, ["memo", "memo-fwd"]);
}
