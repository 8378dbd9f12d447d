//! Constants for the in-memory R-Tree implementation.

/// Default maximum number of entries per node
pub const DEFAULT_CAPACITY: usize = 4;

/// Default minimum occupancy ratio of a non-root node
pub const DEFAULT_FILL_FACTOR: f64 = 0.4;

/// Default number of axes
pub const DEFAULT_DIMENSION: usize = 2;

/// Lower bound of the minimum fill, whatever the fill factor
pub const MIN_FILL_FLOOR: usize = 2;

/// Smallest dimension a point or box may have
pub const MIN_DIMENSION: usize = 2;
