//! Generic self-balancing binary search tree (AVL)
//!
//! One implementation, instantiated twice by the triage state: keyed by
//! patient id and keyed by patient name. Heights are cached per node, so
//! `height()` is O(1) and every rotation recomputes only the nodes it
//! touched. Balance factor = height(left) - height(right), kept in [-1, 1].

use std::cmp::Ordering;

type Link<K, V> = Option<Box<Node<K, V>>>;

struct Node<K, V> {
    key: K,
    value: V,
    height: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            height: 1,
            left: None,
            right: None,
        }
    }
}

/// Height-balanced ordered index over any totally ordered key type.
pub struct AvlTree<K: Ord, V> {
    root: Link<K, V>,
    size: usize,
}

impl<K: Ord, V> AvlTree<K, V> {
    pub fn new() -> Self {
        Self {
            root: None,
            size: 0,
        }
    }

    /// Insert or update the value for `key`. O(log n).
    ///
    /// An existing key keeps its node; only the value is overwritten.
    pub fn insert(&mut self, key: K, value: V) {
        let mut added = false;
        let root = self.root.take();
        self.root = Some(Self::insert_link(root, key, value, &mut added));
        if added {
            self.size += 1;
        }
    }

    /// Look up the value for `key`. O(log n).
    pub fn search(&self, key: &K) -> Option<&V> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match key.cmp(&node.key) {
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
                Ordering::Equal => return Some(&node.value),
            }
        }
        None
    }

    /// Remove the entry for `key`, rebalancing every ancestor on the way
    /// back up. Returns whether the key was present. O(log n).
    pub fn delete(&mut self, key: &K) -> bool {
        let mut removed = false;
        let root = self.root.take();
        self.root = Self::delete_link(root, key, &mut removed);
        if removed {
            self.size -= 1;
        }
        removed
    }

    /// Tree height from the cached root value (0 when empty). O(1).
    pub fn height(&self) -> usize {
        Self::link_height(&self.root)
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// All values in ascending key order. Used for scans that cannot be
    /// served by an exact-key search, e.g. substring matching on names.
    pub fn collect_all_ordered(&self) -> Vec<&V> {
        let mut out = Vec::with_capacity(self.size);
        Self::collect_in_order(self.root.as_deref(), &mut out);
        out
    }

    // Insertion

    fn insert_link(link: Link<K, V>, key: K, value: V, added: &mut bool) -> Box<Node<K, V>> {
        match link {
            None => {
                *added = true;
                Box::new(Node::new(key, value))
            }
            Some(mut node) => {
                match key.cmp(&node.key) {
                    Ordering::Less => {
                        node.left = Some(Self::insert_link(node.left.take(), key, value, added));
                    }
                    Ordering::Greater => {
                        node.right = Some(Self::insert_link(node.right.take(), key, value, added));
                    }
                    Ordering::Equal => {
                        node.value = value;
                        return node;
                    }
                }
                Self::rebalance(node)
            }
        }
    }

    // Deletion

    fn delete_link(link: Link<K, V>, key: &K, removed: &mut bool) -> Link<K, V> {
        let mut node = link?;
        match key.cmp(&node.key) {
            Ordering::Less => {
                node.left = Self::delete_link(node.left.take(), key, removed);
            }
            Ordering::Greater => {
                node.right = Self::delete_link(node.right.take(), key, removed);
            }
            Ordering::Equal => {
                *removed = true;
                match (node.left.take(), node.right.take()) {
                    (None, right) => return right,
                    (left, None) => return left,
                    (Some(left), Some(right)) => {
                        // Two children: adopt the in-order successor
                        // (minimum of the right subtree), which is removed
                        // from that subtree with rebalancing on unwind.
                        let (rest, successor_key, successor_value) = Self::take_min(right);
                        node.key = successor_key;
                        node.value = successor_value;
                        node.left = Some(left);
                        node.right = rest;
                    }
                }
            }
        }
        Some(Self::rebalance(node))
    }

    /// Detach the minimum node of the subtree, returning the remaining
    /// (rebalanced) subtree together with the extracted key and value.
    fn take_min(mut node: Box<Node<K, V>>) -> (Link<K, V>, K, V) {
        match node.left.take() {
            None => {
                let Node {
                    key, value, right, ..
                } = *node;
                (right, key, value)
            }
            Some(left) => {
                let (rest, key, value) = Self::take_min(left);
                node.left = rest;
                (Some(Self::rebalance(node)), key, value)
            }
        }
    }

    // AVL balancing

    fn rebalance(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
        Self::update_height(&mut node);
        let bf = Self::balance_factor(&node);

        if bf > 1 {
            // Left-heavy; an inner-leaning left child needs the double rotation
            let left = node.left.take().expect("left child exists when left-heavy");
            node.left = if Self::balance_factor(&left) < 0 {
                Some(Self::rotate_left(left))
            } else {
                Some(left)
            };
            return Self::rotate_right(node);
        }
        if bf < -1 {
            let right = node
                .right
                .take()
                .expect("right child exists when right-heavy");
            node.right = if Self::balance_factor(&right) > 0 {
                Some(Self::rotate_right(right))
            } else {
                Some(right)
            };
            return Self::rotate_left(node);
        }
        node
    }

    fn rotate_right(mut y: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let mut x = y.left.take().expect("right rotation needs a left child");
        y.left = x.right.take();
        Self::update_height(&mut y);
        x.right = Some(y);
        Self::update_height(&mut x);
        x
    }

    fn rotate_left(mut x: Box<Node<K, V>>) -> Box<Node<K, V>> {
        let mut y = x.right.take().expect("left rotation needs a right child");
        x.right = y.left.take();
        Self::update_height(&mut x);
        y.left = Some(x);
        Self::update_height(&mut y);
        y
    }

    // Utilities

    fn link_height(link: &Link<K, V>) -> usize {
        link.as_ref().map_or(0, |node| node.height)
    }

    fn update_height(node: &mut Node<K, V>) {
        node.height = 1 + Self::link_height(&node.left).max(Self::link_height(&node.right));
    }

    fn balance_factor(node: &Node<K, V>) -> isize {
        Self::link_height(&node.left) as isize - Self::link_height(&node.right) as isize
    }

    fn collect_in_order<'a>(node: Option<&'a Node<K, V>>, out: &mut Vec<&'a V>) {
        if let Some(node) = node {
            Self::collect_in_order(node.left.as_deref(), out);
            out.push(&node.value);
            Self::collect_in_order(node.right.as_deref(), out);
        }
    }
}

impl<K: Ord, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
