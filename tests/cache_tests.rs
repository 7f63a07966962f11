// Response cache tests - testing only public APIs
// Author: kelexine (https://github.com/kelexine)

use proptest::prelude::*;
use std::time::Duration;
use twinrag::cache::{CacheConfig, CacheKey, ResponseCache};
use twinrag::models::{InterviewType, RagMetrics};

fn cache(max_size: usize) -> ResponseCache {
    ResponseCache::new(CacheConfig {
        max_size,
        ttl: Duration::from_secs(3600),
    })
}

#[test]
fn test_cache_stats_initialization() {
    let cache = ResponseCache::default();
    let stats = cache.stats();

    assert_eq!(stats.size, 0);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 0);
    assert_eq!(stats.hit_rate, 0.0);
    assert_eq!(stats.max_size, 100);
    assert_eq!(stats.ttl, 3_600_000);
}

#[test]
fn test_cache_config_defaults() {
    let config = CacheConfig::default();

    assert_eq!(config.max_size, 100);
    assert_eq!(config.ttl, Duration::from_secs(3600));
}

#[test]
fn test_key_normalization() {
    let a = CacheKey::new("  What Are Your Strengths?  ", None);
    let b = CacheKey::new("what are your strengths?", None);
    assert_eq!(a, b);
    assert!(a.as_str().ends_with(":default"));

    let technical = InterviewType::Technical.config();
    let c = CacheKey::new("what are your strengths?", Some(&technical));
    assert_ne!(a, c);
}

#[test]
fn test_lru_eviction_respects_recency() {
    let cache = cache(2);
    cache.set("a", "A".into(), RagMetrics::default(), None);
    cache.set("b", "B".into(), RagMetrics::default(), None);
    assert!(cache.get("a", None).is_some());
    cache.set("c", "C".into(), RagMetrics::default(), None);

    assert!(cache.contains("a", None));
    assert!(!cache.contains("b", None));
    assert!(cache.contains("c", None));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_serialized_stats_are_camel_case() {
    let cache = cache(5);
    cache.get("missing", None);
    let json = serde_json::to_value(cache.stats()).unwrap();
    assert_eq!(json["misses"], 1);
    assert_eq!(json["hitRate"], 0.0);
    assert_eq!(json["maxSize"], 5);
}

#[derive(Debug, Clone)]
enum Op {
    Get(u8),
    Set(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..12).prop_map(Op::Get),
        (0u8..12).prop_map(Op::Set),
    ]
}

proptest! {
    #[test]
    fn prop_size_bounded_and_lookups_counted(
        max_size in 1usize..6,
        ops in proptest::collection::vec(op(), 0..60),
    ) {
        let cache = cache(max_size);
        let mut gets = 0u64;

        for op in &ops {
            match op {
                Op::Get(k) => {
                    gets += 1;
                    cache.get(&format!("q{}", k), None);
                }
                Op::Set(k) => {
                    cache.set(&format!("q{}", k), format!("r{}", k), RagMetrics::default(), None);
                }
            }
            prop_assert!(cache.len() <= max_size);
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits + stats.misses, gets);
        prop_assert!((0.0..=1.0).contains(&stats.hit_rate));
    }

    #[test]
    fn prop_last_set_wins(k in 0u8..4, first in "[a-z]{1,8}", second in "[a-z]{1,8}") {
        let cache = cache(4);
        let q = format!("q{}", k);
        cache.set(&q, first, RagMetrics::default(), None);
        cache.set(&q, second.clone(), RagMetrics::default(), None);

        let entry = cache.get(&q, None).unwrap();
        prop_assert_eq!(entry.response, second);
        prop_assert_eq!(cache.len(), 1);
    }
}
