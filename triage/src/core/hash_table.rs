//! Hash table with separate chaining
//!
//! Each bucket owns a singly linked chain of nodes. The table doubles and
//! rehashes *before* an insertion that would push the load factor past
//! 0.75, so the load factor bound holds immediately after every put.
//!
//! A running collision counter (new key landing in a non-empty bucket) is
//! kept as an observability metric; it plays no part in correctness.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const DEFAULT_CAPACITY: usize = 32;
const LOAD_FACTOR_LIMIT: f64 = 0.75;

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    next: Link<K, V>,
}

/// Chained hash table with O(1) average put/get/remove.
pub struct HashTable<K: Hash + Eq, V> {
    buckets: Vec<Link<K, V>>,
    size: usize,
    collisions: u64,
}

impl<K: Hash + Eq, V> HashTable<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(4);
        Self {
            buckets: (0..capacity).map(|_| None).collect(),
            size: 0,
            collisions: 0,
        }
    }

    /// Insert or update `key`. If inserting a new key would push the load
    /// factor past the limit, the table grows and rehashes first.
    pub fn put(&mut self, key: K, value: V) {
        // Existing key: overwrite in place, no growth needed.
        let index = self.bucket_index(&key);
        let mut current = self.buckets[index].as_mut();
        while let Some(node) = current {
            if node.key == key {
                node.value = value;
                return;
            }
            current = node.next.as_mut();
        }

        if (self.size + 1) as f64 / self.buckets.len() as f64 > LOAD_FACTOR_LIMIT {
            self.grow();
        }

        let index = self.bucket_index(&key);
        let next = self.buckets[index].take();
        if next.is_some() {
            self.collisions += 1;
        }
        self.buckets[index] = Some(Box::new(Node { key, value, next }));
        self.size += 1;
    }

    /// Value for `key`, or `None` if absent. O(1) average.
    pub fn get(&self, key: &K) -> Option<&V> {
        let index = self.bucket_index(key);
        let mut current = self.buckets[index].as_deref();
        while let Some(node) = current {
            if node.key == *key {
                return Some(&node.value);
            }
            current = node.next.as_deref();
        }
        None
    }

    /// Remove the entry for `key`, returning its value. O(1) average.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.bucket_index(key);
        let removed = Self::remove_from_chain(&mut self.buckets[index], key);
        if removed.is_some() {
            self.size -= 1;
        }
        removed
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.buckets.len() as f64
    }

    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    // Internals

    fn remove_from_chain(link: &mut Link<K, V>, key: &K) -> Option<V> {
        let matches = match link {
            None => return None,
            Some(node) => node.key == *key,
        };
        if matches {
            let node = link.take().expect("chain head checked above");
            *link = node.next;
            Some(node.value)
        } else {
            let node = link.as_mut().expect("chain head checked above");
            Self::remove_from_chain(&mut node.next, key)
        }
    }

    fn bucket_index(&self, key: &K) -> usize {
        Self::index_for(key, self.buckets.len())
    }

    fn index_for(key: &K, capacity: usize) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % capacity as u64) as usize
    }

    /// Double the capacity and rehash every node into its new bucket.
    fn grow(&mut self) {
        let new_capacity = self.buckets.len() * 2;
        let mut new_buckets: Vec<Link<K, V>> = (0..new_capacity).map(|_| None).collect();

        for bucket in self.buckets.iter_mut() {
            let mut current = bucket.take();
            while let Some(mut node) = current {
                current = node.next.take();
                let index = Self::index_for(&node.key, new_capacity);
                node.next = new_buckets[index].take();
                new_buckets[index] = Some(node);
            }
        }

        self.buckets = new_buckets;
    }
}

impl<K: Hash + Eq, V> Default for HashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
