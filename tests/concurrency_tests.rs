//! Concurrency and thread safety tests for setmatch

use std::sync::Arc;
use std::thread;

use setmatch::{MatchConfig, Matcher, SharedMatcher};

#[test]
fn concurrent_queries_on_a_frozen_matcher() {
    let mut matcher = Matcher::new();
    for id in 0..200u32 {
        matcher.add(id, vec![id % 17, id % 23, 1000 + id]).unwrap();
    }
    let matcher = Arc::new(matcher);
    let cfg = MatchConfig::default().with_containment_min(1u64);

    let expected: Vec<_> = {
        let mut hits: Vec<u32> = matcher
            .by_item(&[3u32, 5], &cfg, None::<&u32>)
            .unwrap()
            .map(|h| *h.id)
            .collect();
        hits.sort_unstable();
        hits
    };

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let matcher = Arc::clone(&matcher);
            thread::spawn(move || {
                let mut hits: Vec<u32> = matcher
                    .by_item(&[3u32, 5], &cfg, None::<&u32>)
                    .unwrap()
                    .map(|h| *h.id)
                    .collect();
                hits.sort_unstable();
                hits
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), expected, "thread {i} diverged");
    }
}

#[test]
fn concurrent_inserts_through_shared_matcher() {
    let shared: SharedMatcher<String, u32> = SharedMatcher::new();

    let handles: Vec<_> = (0..8u32)
        .map(|t| {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..25u32 {
                    shared
                        .add(format!("t{t}-{i}"), [t, 100 + i])
                        .expect("ids are unique per thread");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(shared.len(), 200);
    // every item from thread 3 shares element 3
    let hits = shared
        .by_id_owned("t3-0", &MatchConfig::default(), Some("t3-0"))
        .unwrap();
    assert_eq!(hits.iter().filter(|h| h.id.starts_with("t3-")).count(), 24);
}

#[test]
fn racing_duplicate_inserts_admit_exactly_one() {
    let shared: SharedMatcher<&'static str, u32> = SharedMatcher::new();

    let handles: Vec<_> = (0..6u32)
        .map(|t| {
            let shared = shared.clone();
            thread::spawn(move || shared.add("contested", [t]).is_ok())
        })
        .collect();
    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(shared.len(), 1);
}
