//! # R-Tree Index - In-memory R-Tree maintenance engine
//!
//! This crate provides an in-memory R-Tree over n-dimensional axis-aligned
//! bounding boxes, kept balanced under insertion and deletion.
//!
//! ## Features
//!
//! - **Quadratic Split**: Guttman's quadratic split of overflowing nodes
//! - **Condense and Reinsert**: Under-filled nodes are detached on delete
//!   and their entries reinserted
//! - **N-Dimensional**: Any dimension from 2 up, fixed per tree
//! - **Configurable**: Capacity, fill factor, variant and dimension through
//!   a serde-friendly [`RTreeConfig`]
//! - **Diagnostics**: Statistics and a full structural integrity check
//! - **Thread Safe**: [`SharedRTree`] wraps a tree behind a reader-writer lock
//!
//! ## Quick Start
//!
//! ```rust
//! use rtree_index::{BoundingBox, RTree, RTreeConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tree = RTree::new(RTreeConfig::default().with_capacity(8))?;
//!
//! for i in 0..100i32 {
//!     let x = f64::from(i % 10) * 10.0;
//!     let y = f64::from(i / 10) * 10.0;
//!     tree.insert(BoundingBox::from_coords(&[x, y], &[x + 5.0, y + 5.0])?)?;
//! }
//! assert_eq!(tree.len(), 100);
//! assert!(tree.height() >= 2);
//!
//! let gone = BoundingBox::from_coords(&[0.0, 0.0], &[5.0, 5.0])?;
//! assert!(tree.delete(&gone)?.is_some());
//! assert!(tree.check_integrity()?.is_valid);
//! # Ok(())
//! # }
//! ```

// Geometry
pub mod bounding_box;
pub mod point;

// R-Tree engine
pub mod rtree;
pub mod spatial_index;

pub use bounding_box::BoundingBox;
pub use point::Point;

pub use rtree::{
    ChildRef, IntegrityReport, Node, NodeId, RTree, RTreeConfig, RTreeStats, SpatialError,
    SpatialResult, TreeVariant,
};

pub use spatial_index::{SharedRTree, SpatialIndex};
