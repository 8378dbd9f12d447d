//! Core types and data structures for the R-Tree.
//!
//! This module defines the fundamental types used throughout the R-Tree:
//! - Error types and result types
//! - Node types (Leaf and Internal)
//! - Statistics and integrity report structures

use thiserror::Error;

use crate::bounding_box::BoundingBox;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur in spatial indexing operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl SpatialError {
    pub(crate) fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        SpatialError::InvalidArgument(format!(
            "dimension mismatch: expected {}, got {}",
            expected, actual
        ))
    }

    pub(crate) fn dangling(node: NodeId) -> Self {
        SpatialError::InvalidOperation(format!("node {} is not allocated", node))
    }
}

/// Result type for spatial operations
pub type SpatialResult<T> = Result<T, SpatialError>;

/// Node ID - slot of a node in the tree's arena
pub type NodeId = usize;

// ============================================================================
// Node Types
// ============================================================================

/// A child reference in an internal node, paired with the child's tight box
#[derive(Debug, Clone, PartialEq)]
pub struct ChildRef {
    pub bbox: BoundingBox,
    pub node: NodeId,
}

/// Node types in the R-Tree
///
/// `parent` is a navigational back-reference only; ownership flows from the
/// tree's arena through the `children` lists.
#[derive(Debug, Clone)]
pub enum Node {
    /// Leaf node containing actual entries
    Leaf {
        parent: Option<NodeId>,
        entries: Vec<BoundingBox>,
    },
    /// Internal node containing child references
    Internal {
        parent: Option<NodeId>,
        children: Vec<ChildRef>,
        level: u32, // Height from leaf level (leaves are 0)
    },
}

impl Node {
    pub(crate) fn empty_leaf(parent: Option<NodeId>) -> Self {
        Node::Leaf {
            parent,
            entries: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Leaf { parent, .. } | Node::Internal { parent, .. } => *parent,
        }
    }

    pub(crate) fn set_parent(&mut self, new_parent: Option<NodeId>) {
        match self {
            Node::Leaf { parent, .. } | Node::Internal { parent, .. } => *parent = new_parent,
        }
    }

    pub fn level(&self) -> u32 {
        match self {
            Node::Leaf { .. } => 0,
            Node::Internal { level, .. } => *level,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Number of used entries (boxes in a leaf, children in an internal node)
    pub fn len(&self) -> usize {
        match self {
            Node::Leaf { entries, .. } => entries.len(),
            Node::Internal { children, .. } => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The boxes stored in this node, in slot order
    pub fn entry_boxes(&self) -> Vec<BoundingBox> {
        match self {
            Node::Leaf { entries, .. } => entries.clone(),
            Node::Internal { children, .. } => children.iter().map(|c| c.bbox.clone()).collect(),
        }
    }

    /// Child node ids in slot order; empty for a leaf
    pub fn child_ids(&self) -> Vec<NodeId> {
        match self {
            Node::Leaf { .. } => Vec::new(),
            Node::Internal { children, .. } => children.iter().map(|c| c.node).collect(),
        }
    }

    /// Get the bounding box enclosing all children/entries, if any
    pub fn compute_bbox(&self) -> Option<BoundingBox> {
        match self {
            Node::Leaf { entries, .. } => {
                let (first, rest) = entries.split_first()?;
                let mut bbox = first.clone();
                for e in rest {
                    bbox.expand(e);
                }
                Some(bbox)
            }
            Node::Internal { children, .. } => {
                let (first, rest) = children.split_first()?;
                let mut bbox = first.bbox.clone();
                for c in rest {
                    bbox.expand(&c.bbox);
                }
                Some(bbox)
            }
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Statistics about the R-Tree shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RTreeStats {
    pub total_entries: u64,
    pub node_count: u64,
    pub leaf_count: u64,
    pub tree_height: u32,
    /// Average occupancy of all nodes relative to capacity (0.0 - 1.0)
    pub fill_ratio: f64,
}

// ============================================================================
// Integrity Checking
// ============================================================================

/// Result of an integrity check over the whole tree
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    /// Total nodes visited
    pub nodes_checked: u64,
    /// Summary of findings
    pub is_valid: bool,
    /// Detailed error messages
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub fn new() -> Self {
        Self {
            nodes_checked: 0,
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }
}

impl Default for IntegrityReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(low: &[f64], high: &[f64]) -> BoundingBox {
        BoundingBox::from_coords(low, high).unwrap()
    }

    #[test]
    fn test_leaf_accessors() {
        let node = Node::Leaf {
            parent: Some(3),
            entries: vec![bbox(&[0.0, 0.0], &[1.0, 1.0]), bbox(&[4.0, 4.0], &[5.0, 6.0])],
        };
        assert!(node.is_leaf());
        assert!(!node.is_root());
        assert_eq!(node.parent(), Some(3));
        assert_eq!(node.level(), 0);
        assert_eq!(node.len(), 2);
        assert!(node.child_ids().is_empty());
        assert_eq!(node.compute_bbox(), Some(bbox(&[0.0, 0.0], &[5.0, 6.0])));
    }

    #[test]
    fn test_internal_accessors() {
        let mut node = Node::Internal {
            parent: None,
            children: vec![
                ChildRef { bbox: bbox(&[0.0, 0.0], &[1.0, 1.0]), node: 1 },
                ChildRef { bbox: bbox(&[-1.0, 2.0], &[0.0, 3.0]), node: 2 },
            ],
            level: 1,
        };
        assert!(!node.is_leaf());
        assert!(node.is_root());
        assert_eq!(node.level(), 1);
        assert_eq!(node.child_ids(), vec![1, 2]);
        assert_eq!(node.compute_bbox(), Some(bbox(&[-1.0, 0.0], &[1.0, 3.0])));

        node.set_parent(Some(9));
        assert_eq!(node.parent(), Some(9));
    }

    #[test]
    fn test_empty_node_has_no_bbox() {
        let node = Node::empty_leaf(None);
        assert!(node.is_empty());
        assert_eq!(node.compute_bbox(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = SpatialError::dimension_mismatch(2, 3);
        assert_eq!(
            err.to_string(),
            "Invalid argument: dimension mismatch: expected 2, got 3"
        );
        assert_eq!(
            SpatialError::Unsupported("linear split".into()).to_string(),
            "Unsupported operation: linear split"
        );
        assert_eq!(
            SpatialError::dangling(7).to_string(),
            "Invalid operation: node 7 is not allocated"
        );
    }

    #[test]
    fn test_integrity_report_record() {
        let mut report = IntegrityReport::default();
        assert!(report.is_valid);
        report.record("broken".into());
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec!["broken".to_string()]);
    }
}
