//! Integration Tests for the Local Cache
//!
//! Exercises the public API end to end: expiry timing, sweeping, typed
//! lookups, concurrent access and the process-wide instance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use local_cache::{global, CacheError, CacheStore, Config, LocalCache};
use tokio_test::{assert_err, assert_ok};

// == Helper Functions ==

fn manual_cache() -> LocalCache {
    LocalCache::without_sweeper()
}

// == Expiry Tests ==

#[test]
fn test_name_expires_after_ttl() {
    let cache = manual_cache();

    cache.set("name", "张三".to_string(), 2_000);
    assert_eq!(
        cache.get_cloned::<String>("name").unwrap().as_deref(),
        Some("张三")
    );

    thread::sleep(Duration::from_millis(3_000));

    assert!(cache.get::<String>("name").unwrap().is_none());
}

#[test]
fn test_expiration_boundary() {
    let cache = manual_cache();

    cache.set("k", 7u32, 2_000);

    thread::sleep(Duration::from_millis(1_000));
    assert_eq!(cache.get_cloned::<u32>("k").unwrap(), Some(7));

    thread::sleep(Duration::from_millis(2_000));
    assert_eq!(cache.get_cloned::<u32>("k").unwrap(), None);
}

#[test]
fn test_get_before_any_set() {
    let cache = manual_cache();

    assert!(assert_ok!(cache.get::<String>("missing")).is_none());
    assert!(!cache.contains_key("missing"));
}

#[test]
fn test_zero_and_negative_ttl_absent() {
    let cache = manual_cache();

    cache.set("zero", "v", 0);
    cache.set("negative", "v", -250);

    assert!(cache.get::<&str>("zero").unwrap().is_none());
    assert!(cache.get::<&str>("negative").unwrap().is_none());
}

#[test]
fn test_remove_is_idempotent() {
    let cache = manual_cache();

    cache.set("k", 1, 60_000);
    cache.remove("k");
    cache.remove("k");

    assert!(cache.get::<i32>("k").unwrap().is_none());
    assert!(cache.is_empty());
}

// == Typed Lookup Tests ==

#[test]
fn test_count_read_as_text_is_type_mismatch() {
    let cache = manual_cache();

    cache.set("count", 42, 60_000);

    let err = assert_err!(cache.get::<String>("count"));
    match err {
        CacheError::TypeMismatch {
            key,
            expected,
            found,
        } => {
            assert_eq!(key, "count");
            assert_eq!(expected, std::any::type_name::<String>());
            assert_eq!(found, "i32");
        }
        other => panic!("expected type mismatch, got {:?}", other),
    }

    assert_eq!(cache.get_cloned::<i32>("count").unwrap(), Some(42));
}

// == Sweep Tests ==

#[test]
fn test_sweep_keeps_only_live_entries() {
    let cache = manual_cache();

    for i in 0..50 {
        let ttl = if i % 2 == 0 { 60_000 } else { 50 };
        cache.set(format!("key{}", i), i, ttl);
    }

    thread::sleep(Duration::from_millis(150));

    let report = cache.sweep_now();
    assert_eq!(report.retained, 25);
    assert_eq!(report.reclaimed, 25);
    assert_eq!(cache.len(), 25);

    for i in 0..50 {
        let found = cache.get_cloned::<i32>(&format!("key{}", i)).unwrap();
        if i % 2 == 0 {
            assert_eq!(found, Some(i));
        } else {
            assert_eq!(found, None);
        }
    }
}

#[tokio::test]
async fn test_background_sweep_reclaims_memory() {
    let config = Config::default().with_sweep_interval(Duration::from_millis(100));
    let mut cache = LocalCache::new(&config).unwrap();

    cache.set("short", "gone", 50);
    cache.set("long", "kept", 60_000);

    tokio::time::sleep(Duration::from_millis(350)).await;

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get_cloned::<&str>("long").unwrap(), Some("kept"));

    let stats = cache.stats();
    assert!(stats.sweeps >= 2);
    assert_eq!(stats.reclaimed_total, 1);
    assert_eq!(stats.failed_sweeps, 0);

    cache.shutdown();
    assert!(!cache.is_sweeping());
}

// == Concurrency Tests ==

#[test]
fn test_concurrent_access_with_sweeps() {
    const WORKERS: usize = 8;
    const ROUNDS: usize = 2_000;

    let store = Arc::new(CacheStore::new());
    let barrier = Arc::new(Barrier::new(WORKERS + 1));
    let done = Arc::new(AtomicBool::new(false));

    let sweeper = {
        let store = store.clone();
        let barrier = barrier.clone();
        let done = done.clone();
        thread::spawn(move || {
            barrier.wait();
            while !done.load(Ordering::Relaxed) {
                store.sweep();
            }
        })
    };

    let workers: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let store = store.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    let key = format!("key{}", (worker + round) % 16);
                    match round % 3 {
                        0 => {
                            let ttl = if round % 2 == 0 { 60_000 } else { 1 };
                            store.set(key.clone(), format!("{}:{}", key, round), ttl);
                        }
                        1 => {
                            if let Some(value) = store.get::<String>(&key).unwrap() {
                                // Values are always tagged with the key they were stored under
                                assert!(value.starts_with(&format!("{}:", key)));
                            }
                        }
                        _ => store.remove(&key),
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker panicked");
    }
    done.store(true, Ordering::Relaxed);
    sweeper.join().expect("sweeper panicked");

    store.sweep();
    assert!(store.len() <= 16);
    assert!(store.get::<String>("never_set").unwrap().is_none());
    assert_eq!(store.stats().failed_sweeps, 0);
}

#[test]
fn test_writers_not_stalled_by_large_sweep() {
    const ENTRIES: usize = 200_000;

    let store = Arc::new(CacheStore::new());
    for i in 0..ENTRIES {
        store.set(format!("key{}", i), i, 60_000);
    }

    let sweeping = Arc::new(AtomicBool::new(true));
    let sweeper = {
        let store = store.clone();
        let sweeping = sweeping.clone();
        thread::spawn(move || {
            let report = store.sweep();
            sweeping.store(false, Ordering::Release);
            report
        })
    };

    let mut worst = Duration::ZERO;
    let mut writes = 0usize;
    while sweeping.load(Ordering::Acquire) {
        let started = Instant::now();
        store.set(format!("live{}", writes % 64), writes, 60_000);
        store.remove(&format!("live{}", (writes + 32) % 64));
        worst = worst.max(started.elapsed());
        writes += 1;
    }

    let report = sweeper.join().expect("sweeper panicked");
    assert!(report.retained >= ENTRIES);
    assert!(
        worst < Duration::from_millis(100),
        "worst write latency {:?} during a {:?} sweep",
        worst,
        report.elapsed
    );
}

#[test]
fn test_set_then_get_same_thread() {
    let cache = Arc::new(manual_cache());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    let key = format!("t{}-{}", t, i);
                    cache.set(key.clone(), i, 60_000);
                    assert_eq!(cache.get_cloned::<i32>(&key).unwrap(), Some(i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }
    assert_eq!(cache.len(), 2_000);
}

// == Global Instance Tests ==

#[test]
fn test_global_instance() {
    let cache = global();
    assert!(std::ptr::eq(cache, global()));
    assert!(cache.is_sweeping());

    cache.set("global:name", "张三".to_string(), 60_000);
    assert_eq!(
        global().get_cloned::<String>("global:name").unwrap().as_deref(),
        Some("张三")
    );

    global().remove("global:name");
    assert!(!cache.contains_key("global:name"));
}
