//! Tree configuration.

use serde::{Deserialize, Serialize};

use super::rtree_constants::{
    DEFAULT_CAPACITY, DEFAULT_DIMENSION, DEFAULT_FILL_FACTOR, MIN_DIMENSION, MIN_FILL_FLOOR,
};
use super::rtree_types::{SpatialError, SpatialResult};

/// Node split / leaf selection strategy of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeVariant {
    /// Guttman's linear split. Declared but not supported.
    Linear,
    /// Guttman's quadratic split with least-enlargement leaf selection.
    Quadratic,
    /// Exhaustive split. Declared but not supported.
    Exponential,
    /// Least-overlap leaf selection above the leaves, quadratic split.
    RStarLike,
}

impl TreeVariant {
    /// Whether trees of this variant can be built.
    pub fn is_supported(&self) -> bool {
        matches!(self, TreeVariant::Quadratic | TreeVariant::RStarLike)
    }
}

/// Immutable configuration of an [`RTree`](super::RTree).
///
/// # Examples
///
/// ```rust
/// use rtree_index::{RTreeConfig, TreeVariant};
///
/// let config = RTreeConfig::default()
///     .with_capacity(8)
///     .with_fill_factor(0.4)
///     .with_variant(TreeVariant::Quadratic)
///     .with_dimension(3);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.min_fill(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RTreeConfig {
    /// Maximum number of entries per node
    pub capacity: usize,
    /// Minimum occupancy ratio of a non-root node, exclusive range (0, 1)
    pub fill_factor: f64,
    pub variant: TreeVariant,
    /// Number of axes of every box stored in the tree
    pub dimension: usize,
}

impl Default for RTreeConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            fill_factor: DEFAULT_FILL_FACTOR,
            variant: TreeVariant::Quadratic,
            dimension: DEFAULT_DIMENSION,
        }
    }
}

impl RTreeConfig {
    pub fn new(capacity: usize, fill_factor: f64, variant: TreeVariant, dimension: usize) -> Self {
        Self {
            capacity,
            fill_factor,
            variant,
            dimension,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_fill_factor(mut self, fill_factor: f64) -> Self {
        self.fill_factor = fill_factor;
        self
    }

    pub fn with_variant(mut self, variant: TreeVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Minimum number of entries of a non-root node:
    /// `max(2, round(capacity * fill_factor))`.
    pub fn min_fill(&self) -> usize {
        let rounded = (self.capacity as f64 * self.fill_factor).round() as usize;
        rounded.max(MIN_FILL_FLOOR)
    }

    /// Checks the configuration before a tree is built from it.
    pub fn validate(&self) -> SpatialResult<()> {
        if self.capacity < 2 {
            return Err(SpatialError::InvalidArgument(format!(
                "capacity must be greater than 1, got {}",
                self.capacity
            )));
        }
        if !(self.fill_factor > 0.0 && self.fill_factor < 1.0) {
            return Err(SpatialError::InvalidArgument(format!(
                "fill factor must be in (0, 1), got {}",
                self.fill_factor
            )));
        }
        if self.dimension < MIN_DIMENSION {
            return Err(SpatialError::InvalidArgument(format!(
                "dimension must be at least {}, got {}",
                MIN_DIMENSION, self.dimension
            )));
        }
        // A split of capacity + 1 entries must leave min_fill on both sides.
        if 2 * self.min_fill() > self.capacity + 1 {
            return Err(SpatialError::InvalidArgument(format!(
                "capacity {} with fill factor {} needs {} entries per node, \
                 more than a split of {} entries can give both halves",
                self.capacity,
                self.fill_factor,
                self.min_fill(),
                self.capacity + 1
            )));
        }
        if !self.variant.is_supported() {
            return Err(SpatialError::Unsupported(format!(
                "{:?} split is not implemented",
                self.variant
            )));
        }
        Ok(())
    }
}
