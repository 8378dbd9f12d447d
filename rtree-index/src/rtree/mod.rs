//! In-memory R-Tree with quadratic split.
//!
//! This module provides the tree engine and its building blocks:
//! - Arena storage of nodes addressed by [`NodeId`], with parent back-references
//! - Least-enlargement (or least-overlap) leaf selection on insert
//! - Guttman's quadratic split of overflowing nodes, propagated to the root
//! - Deletion with condensation of under-filled nodes and reinsertion of
//!   their entries
//! - Structural diagnostics through [`RTree::check_integrity`]

pub mod rtree_arena;
pub mod rtree_config;
pub mod rtree_constants;
pub mod rtree_split;
pub mod rtree_types;
mod rtree_impl;

pub use rtree_config::{RTreeConfig, TreeVariant};
pub use rtree_constants::{DEFAULT_CAPACITY, DEFAULT_DIMENSION, DEFAULT_FILL_FACTOR};
pub use rtree_impl::RTree;
pub use rtree_types::{
    ChildRef, IntegrityReport, Node, NodeId, RTreeStats, SpatialError, SpatialResult,
};
