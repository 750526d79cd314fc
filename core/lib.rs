//! A multimap: an associative container mapping integer keys to ordered bags
//! of integer values. The index over keys is a cache-conscious B-tree whose
//! nodes are fixed-capacity inline arrays (see `node`), split proactively on
//! the way down rather than bottom-up after the fact (see
//! `node::Node::split_child`). Each key owns a value buffer that grows in
//! whole cache-line increments (see `value_buffer`).
//!
//! Deletion, persistence, concurrency, and generic key/value types are out
//! of scope; keys and values are fixed-width signed integers.

pub mod generate;
mod node;
mod value_buffer;

use std::fmt;

use node::{KeyRecord, Node};
pub use value_buffer::AllocError;

pub type Key = i32;
pub type Value = i32;

/// Maximum number of keys per node; maximum children = `FANOUT + 1` (spec §3).
/// Changing this changes only performance, never the multimap's observable
/// behavior.
#[cfg(not(test))]
pub const FANOUT: usize = 500;
#[cfg(test)]
pub const FANOUT: usize = 4;

/// Allocation-granularity unit used to size each key's value buffer (spec §4.5).
pub const LINE_SIZE: usize = 64;

const _: () = assert!(FANOUT >= 2, "FANOUT must be at least 2");

/// Failure modes `add_value` can report. Node allocation (leaf/internal node
/// creation, splits, root growth) is not represented here: it goes through
/// ordinary infallible `Box`/array construction, so exhausting the allocator
/// there aborts the process, matching the source's fatal-on-allocator-
/// exhaustion behavior. Only the per-key value buffer's growth is fallible,
/// since it's the one allocation reachable through a stable, fallible API
/// (`Vec::try_reserve_exact`).
#[derive(Debug)]
pub enum MultiMapError {
    Alloc(AllocError),
}

impl fmt::Display for MultiMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alloc(err) => err.fmt(f),
        }
    }
}
impl std::error::Error for MultiMapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Alloc(err) => Some(err),
        }
    }
}
impl From<AllocError> for MultiMapError {
    fn from(value: AllocError) -> Self {
        Self::Alloc(value)
    }
}

/// The public façade (spec §6). Owns an optional root node; an empty tree
/// is represented by the absence of a root, not a sentinel node.
#[derive(Default)]
pub struct MultiMap {
    root: Option<Box<Node>>,
}

impl MultiMap {
    /// Creates an empty multimap.
    pub fn new() -> Self {
        MultiMap { root: None }
    }

    /// Releases every node, key record, and value buffer, leaving the
    /// multimap empty. The handle itself survives and may be reused: Rust's
    /// `Drop` glue tears down the discarded tree in the same post-order
    /// shape spec §4.7 describes (a node's value buffers and children are
    /// always dropped before the node's own allocation is freed), so this
    /// is just replacing `root` with `None`.
    pub fn clear(&mut self) {
        self.root = None;
    }

    /// Inserts `(key, value)`, creating the key's record if it doesn't
    /// already exist. Duplicate `(key, value)` pairs are stored as
    /// duplicates, not deduplicated (spec §6). If the value buffer's
    /// allocation fails, the key is not left behind half-created: a
    /// previously-absent key remains absent, so `contains_key` never
    /// reports `true` for a key that has no successfully added value.
    pub fn add_value(&mut self, key: Key, value: Value) -> Result<(), MultiMapError> {
        self.ensure_root_capacity();
        self.root
            .as_mut()
            .unwrap()
            .find_or_insert(key, value)
            .map_err(MultiMapError::from)
    }

    /// True iff any value has ever been added for `key`.
    pub fn contains_key(&self, key: Key) -> bool {
        self.find(key).is_some()
    }

    /// True iff `(key, value)` has been added: a lookup followed by a
    /// linear scan of that key's value buffer (spec §6).
    pub fn contains_pair(&self, key: Key, value: Value) -> bool {
        self.find(key).is_some_and(|rec| rec.buffer.contains(value))
    }

    /// Delivers every `(key, value)` pair to `visit`, in ascending-key order
    /// and, within a key, in insertion order (spec §4.6). `visit` must not
    /// mutate the multimap; there is no way to do so through this shared
    /// borrow.
    pub fn traverse(&self, mut visit: impl FnMut(Key, Value)) {
        if let Some(root) = &self.root {
            root.traverse(&mut visit);
        }
    }

    fn find(&self, key: Key) -> Option<&KeyRecord> {
        self.root.as_ref().and_then(|root| root.find(key))
    }

    /// Ensures a root exists and isn't already full. Grows the root (spec
    /// §4.3 "Root growth") before descending into it, so the node-level
    /// recursion in `Node::find_or_insert` can assume its own parent is
    /// never full.
    fn ensure_root_capacity(&mut self) {
        if self.root.is_none() {
            self.root = Some(Box::new(Node::new(true)));
        } else if self.root.as_ref().unwrap().is_full() {
            self.grow_root();
        }
    }

    fn grow_root(&mut self) {
        let old_root = self.root.take().expect("grow_root requires an existing root");
        let mut new_root = Box::new(Node::new(false));
        new_root.attach_first_child(old_root);
        new_root.split_child(0);
        self.root = Some(new_root);
    }
}
