//! Thread-safe access to an R-Tree.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::bounding_box::BoundingBox;
use crate::rtree::{IntegrityReport, RTree, RTreeConfig, RTreeStats, SpatialResult};

/// A spatial index over bounding boxes that can be shared between threads.
pub trait SpatialIndex: Send + Sync {
    /// Adds a box to the index.
    fn insert(&self, key: BoundingBox) -> SpatialResult<()>;

    /// Removes one box equal to `key`; returns its former leaf slot, or
    /// `None` if the index holds no such box.
    fn delete(&self, key: &BoundingBox) -> SpatialResult<Option<usize>>;

    /// Gets the number of boxes in the index.
    fn size(&self) -> u64;

    /// Clears all data from the index.
    fn clear(&self) -> SpatialResult<()>;
}

/// An [`RTree`] behind a reader-writer lock.
/// Uses Pimpl pattern for cheap cloning; clones share the same tree.
///
/// # Example
/// ```rust
/// use rtree_index::{BoundingBox, RTreeConfig, SharedRTree, SpatialIndex};
///
/// let index = SharedRTree::new(RTreeConfig::default()).unwrap();
/// let worker = index.clone();
///
/// std::thread::spawn(move || {
///     worker.insert(BoundingBox::from_coords(&[0.0, 0.0], &[1.0, 1.0]).unwrap()).unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(index.size(), 1);
/// ```
#[derive(Clone)]
pub struct SharedRTree {
    inner: Arc<SharedRTreeInner>,
}

struct SharedRTreeInner {
    tree: RwLock<RTree>,
}

impl SharedRTree {
    pub fn new(config: RTreeConfig) -> SpatialResult<Self> {
        Ok(Self::from_tree(RTree::new(config)?))
    }

    pub fn from_tree(tree: RTree) -> Self {
        Self {
            inner: Arc::new(SharedRTreeInner {
                tree: RwLock::new(tree),
            }),
        }
    }

    /// Runs `f` with shared access to the tree.
    pub fn read<R>(&self, f: impl FnOnce(&RTree) -> R) -> R {
        f(&self.inner.tree.read())
    }

    /// Runs `f` with exclusive access to the tree.
    pub fn write<R>(&self, f: impl FnOnce(&mut RTree) -> R) -> R {
        f(&mut self.inner.tree.write())
    }

    pub fn stats(&self) -> SpatialResult<RTreeStats> {
        self.inner.tree.read().stats()
    }

    pub fn check_integrity(&self) -> SpatialResult<IntegrityReport> {
        self.inner.tree.read().check_integrity()
    }
}

impl SpatialIndex for SharedRTree {
    fn insert(&self, key: BoundingBox) -> SpatialResult<()> {
        self.inner.tree.write().insert(key)
    }

    fn delete(&self, key: &BoundingBox) -> SpatialResult<Option<usize>> {
        self.inner.tree.write().delete(key)
    }

    fn size(&self) -> u64 {
        self.inner.tree.read().len()
    }

    fn clear(&self) -> SpatialResult<()> {
        self.inner.tree.write().clear();
        Ok(())
    }
}
