use std::iter::Rev;
use std::path::PathBuf;
use std::vec::IntoIter;

use crate::classify::Action;

/// An entry whose removal waits until everything below it was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredItem {
    pub path: PathBuf,
    pub action: Action,
}

/// Deferred work of one root, in discovery order.
///
/// A top-down walk discovers a directory before anything inside it, so
/// reading the queue back-to-front always yields children before their
/// parents. Draining consumes the queue: nothing can be pushed once the
/// bottom-up pass started.
#[derive(Debug, Default)]
pub struct DeferredQueue {
    items: Vec<DeferredItem>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf, action: Action) {
        self.items.push(DeferredItem { path, action });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume the queue, deepest entries first.
    pub fn into_bottom_up(self) -> Rev<IntoIter<DeferredItem>> {
        self.items.into_iter().rev()
    }
}
