//! Checks that every key and value the map takes ownership of is dropped exactly once, whichever
//! way it leaves the tree

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::prelude::*;
use tracing_subscriber::EnvFilter;

use iterative_bst::{BSTMap, Config, Error};

fn init_logging() {
    // Several tests race to install the subscriber, only the first one wins
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Default)]
struct Counters {
    created: AtomicUsize,
    dropped: AtomicUsize,
}

impl Counters {
    fn live(&self) -> usize {
        self.created.load(Ordering::SeqCst) - self.dropped.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct Tracked {
    counters: Arc<Counters>,
}

impl Tracked {
    fn new(counters: &Arc<Counters>) -> Self {
        counters.created.fetch_add(1, Ordering::SeqCst);
        Self {counters: Arc::clone(counters)}
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.counters.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn random_operations_release_everything() {
    init_logging();

    let counters = Arc::new(Counters::default());
    let mut map = BSTMap::new();
    let mut rng = rand::thread_rng();

    for _ in 0..2_000 {
        let key = rng.gen_range(0..128);
        if rng.gen_bool(0.6) {
            // Overwriting hands the old value back to us, which drops it here
            map.insert(key, Tracked::new(&counters));
        } else {
            map.remove(&key);
        }

        assert_eq!(counters.live(), map.len());
    }

    map.dispose().unwrap();
    assert!(map.is_empty());
    assert_eq!(counters.live(), 0);
}

#[test]
fn dropping_the_map_releases_everything() {
    init_logging();

    let counters = Arc::new(Counters::default());
    let mut map = BSTMap::new();
    for key in 0..500 {
        map.insert(key, Tracked::new(&counters));
    }
    for key in (0..500).step_by(3) {
        map.remove(&key);
    }
    assert_eq!(counters.live(), map.len());

    drop(map);
    assert_eq!(counters.live(), 0);
    assert_eq!(counters.created.load(Ordering::SeqCst), 500);
}

#[test]
fn failed_dispose_still_releases_everything() {
    init_logging();

    let counters = Arc::new(Counters::default());
    let mut map = BSTMap::with_config(Config::new().with_stack_limit(8));
    // Ascending keys form a right spine longer than the stack limit
    for key in 0..64 {
        map.insert(key, Tracked::new(&counters));
    }

    match map.dispose() {
        Err(Error::StackOverflow {limit}) => assert_eq!(limit, 8),
        other => panic!("expected the dispose stack to overflow, got {:?}", other),
    }

    assert!(map.is_empty());
    assert_eq!(counters.live(), 0);

    // The map is still usable afterwards
    map.insert(1, Tracked::new(&counters));
    assert_eq!(map.len(), 1);
    map.dispose().unwrap();
    assert_eq!(counters.live(), 0);
}

#[test]
fn removed_entries_are_handed_back() {
    init_logging();

    let counters = Arc::new(Counters::default());
    let mut map = BSTMap::new();
    for &key in &[50, 20, 70, 10, 30, 60, 80] {
        map.insert(key, Tracked::new(&counters));
    }

    // Two subtrees: the entry moves out while 30 takes over its node
    let (key, value) = map.remove_entry(&50).unwrap();
    assert_eq!(key, 50);
    assert_eq!(counters.live(), 7);
    drop(value);
    assert_eq!(counters.live(), 6);

    let root = map.root().unwrap();
    assert_eq!(*root.key(), 30);
}

#[test]
fn clear_after_removals_releases_everything() {
    init_logging();

    let counters = Arc::new(Counters::default());
    let mut map = BSTMap::new();
    for key in 0..200 {
        map.insert(key, Tracked::new(&counters));
    }
    // Leaves released nodes scattered through the storage
    for key in (0..200).filter(|key| key % 3 != 1) {
        map.remove(&key);
    }
    assert_eq!(counters.live(), map.len());
    assert!(!map.is_empty());

    map.clear();
    assert!(map.is_empty());
    assert!(map.root().is_none());
    assert_eq!(counters.live(), 0);
    assert_eq!(counters.created.load(Ordering::SeqCst), 200);

    // Cleared storage is handed out again
    for key in 0..10 {
        map.insert(key, Tracked::new(&counters));
    }
    assert_eq!(counters.live(), 10);
    drop(map);
    assert_eq!(counters.live(), 0);
}
