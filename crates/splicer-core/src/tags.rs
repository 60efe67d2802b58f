//! Process-wide index of every label submitted with a splice request.

use std::collections::BTreeSet;

use parking_lot::RwLock;

/// Grow-only set of labels. Lives for the lifetime of the process.
#[derive(Debug, Default)]
pub struct TagIndex {
    tags: RwLock<BTreeSet<String>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `labels` into the index. Returns how many were new.
    pub fn merge<'a, I>(&self, labels: I) -> usize
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut tags = self.tags.write();
        labels
            .into_iter()
            .filter(|label| tags.insert((*label).clone()))
            .count()
    }

    /// Sorted copy of the current contents.
    pub fn snapshot(&self) -> Vec<String> {
        self.tags.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tags.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.read().is_empty()
    }
}
