use std::collections::HashSet;

use ytharvest_core::CommentKey;

/// Keys already collected during one run.
#[derive(Debug, Default)]
pub struct DedupIndex {
    keys: HashSet<CommentKey>,
}

impl DedupIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn seen(&self, key: &CommentKey) -> bool {
        self.keys.contains(key)
    }

    /// Returns `false` if the key was already present.
    pub fn record(&mut self, key: CommentKey) -> bool {
        self.keys.insert(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
