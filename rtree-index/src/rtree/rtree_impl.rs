//! RTree implementation.

use crate::bounding_box::BoundingBox;

use super::rtree_arena::NodeArena;
use super::rtree_config::{RTreeConfig, TreeVariant};
use super::rtree_split::{distribute, split_groups};
use super::rtree_types::{
    ChildRef, IntegrityReport, Node, NodeId, RTreeStats, SpatialError, SpatialResult,
};

/// An in-memory R-Tree over n-dimensional bounding boxes.
///
/// The tree keeps every non-root node between `min_fill` and `capacity`
/// entries, keeps every stored child box tight, and keeps all leaves at the
/// same depth. Inserting splits overflowing nodes on the way up; deleting
/// condenses under-filled nodes and reinserts their entries.
///
/// # Example
/// ```rust
/// use rtree_index::{BoundingBox, RTree, RTreeConfig};
///
/// let mut tree = RTree::new(RTreeConfig::default()).unwrap();
/// let bbox = BoundingBox::from_coords(&[5.0, 30.0], &[25.0, 35.0]).unwrap();
///
/// tree.insert(bbox.clone()).unwrap();
/// assert_eq!(tree.len(), 1);
///
/// assert_eq!(tree.delete(&bbox).unwrap(), Some(0));
/// assert!(tree.is_empty());
/// ```
#[derive(Debug)]
pub struct RTree {
    config: RTreeConfig,
    min_fill: usize,
    arena: NodeArena,
    root: NodeId,
    entry_count: u64,
}

impl RTree {
    /// Create an empty tree: a single leaf as root.
    ///
    /// Fails with `InvalidArgument` for an invalid configuration and with
    /// `Unsupported` for a split variant that is not implemented.
    pub fn new(config: RTreeConfig) -> SpatialResult<Self> {
        config.validate()?;

        let mut arena = NodeArena::new();
        let root = arena.allocate(Node::empty_leaf(None));
        log::debug!(
            "Creating R-Tree: capacity {}, min fill {}, {:?}, {} dimensions",
            config.capacity,
            config.min_fill(),
            config.variant,
            config.dimension
        );

        Ok(Self {
            min_fill: config.min_fill(),
            config,
            arena,
            root,
            entry_count: 0,
        })
    }

    /// Create a tree from individual parameters
    pub fn with_params(
        capacity: usize,
        fill_factor: f64,
        variant: TreeVariant,
        dimension: usize,
    ) -> SpatialResult<Self> {
        Self::new(RTreeConfig::new(capacity, fill_factor, variant, dimension))
    }

    pub fn config(&self) -> &RTreeConfig {
        &self.config
    }

    /// Minimum number of entries of every non-root node
    pub fn min_fill(&self) -> usize {
        self.min_fill
    }

    /// Number of boxes stored in the tree
    pub fn len(&self) -> u64 {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Level of the root; 0 while the root is a leaf
    pub fn height(&self) -> u32 {
        match self.arena.get(self.root) {
            Ok(root) => root.level(),
            Err(err) => {
                log::warn!("Cannot read root {}: {}", self.root, err);
                0
            }
        }
    }

    pub fn node(&self, id: NodeId) -> SpatialResult<&Node> {
        self.arena.get(id)
    }

    /// Boxes stored in the root, in slot order
    pub fn root_entries(&self) -> SpatialResult<Vec<BoundingBox>> {
        Ok(self.arena.get(self.root)?.entry_boxes())
    }

    /// Every box stored in the leaves, left to right
    pub fn leaf_entries(&self) -> SpatialResult<Vec<BoundingBox>> {
        let mut entries = Vec::with_capacity(self.entry_count as usize);
        for id in self.traverse_post_order(self.root)? {
            if let Node::Leaf { entries: leaf, .. } = self.arena.get(id)? {
                entries.extend(leaf.iter().cloned());
            }
        }
        Ok(entries)
    }

    /// Remove every entry, leaving a single empty leaf as root.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = self.arena.allocate(Node::empty_leaf(None));
        self.entry_count = 0;
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert a box.
    ///
    /// Fails with `InvalidArgument` if the box dimension differs from the
    /// tree dimension.
    pub fn insert(&mut self, bbox: BoundingBox) -> SpatialResult<()> {
        self.check_dimension(&bbox)?;
        self.insert_entry(bbox)?;
        self.entry_count += 1;
        Ok(())
    }

    fn insert_entry(&mut self, bbox: BoundingBox) -> SpatialResult<()> {
        let (leaf, slot) = self.choose_leaf(&bbox)?;
        log::trace!("Inserting {} into leaf {} at slot {}", bbox, leaf, slot);

        let sibling = self.insert_into_leaf(leaf, bbox)?;
        self.adjust_tree(leaf, sibling)
    }

    /// Choose the leaf that should receive `bbox`.
    ///
    /// Returns the leaf and the slot the new entry would take in it.
    pub fn choose_leaf(&self, bbox: &BoundingBox) -> SpatialResult<(NodeId, usize)> {
        self.check_dimension(bbox)?;

        let mut current = self.root;
        loop {
            match self.arena.get(current)? {
                Node::Leaf { entries, .. } => return Ok((current, entries.len())),
                Node::Internal {
                    children, level, ..
                } => {
                    let best_idx = match self.config.variant {
                        TreeVariant::RStarLike if *level == 1 => least_overlap(children, bbox),
                        _ => least_enlargement(children, bbox),
                    }
                    .ok_or_else(|| {
                        SpatialError::InvalidOperation(format!(
                            "internal node {} has no children",
                            current
                        ))
                    })?;
                    current = children[best_idx].node;
                }
            }
        }
    }

    /// Append to a leaf, splitting it when it overflows.
    /// Returns the new sibling produced by a split.
    fn insert_into_leaf(&mut self, leaf: NodeId, bbox: BoundingBox) -> SpatialResult<Option<NodeId>> {
        let capacity = self.config.capacity;
        let variant = self.config.variant;
        let min_fill = self.min_fill;

        let Node::Leaf { parent, entries } = self.arena.get_mut(leaf)? else {
            return Err(SpatialError::InvalidOperation(
                "Expected leaf node for insertion".into(),
            ));
        };

        entries.push(bbox);
        if entries.len() <= capacity {
            return Ok(None);
        }

        // The staged entry is the last one
        let groups = match split_groups(variant, entries, min_fill) {
            Ok(groups) => groups,
            Err(err) => {
                entries.pop();
                return Err(err);
            }
        };
        let (remaining, new_entries) = distribute(std::mem::take(entries), &groups);
        *entries = remaining;
        let parent = *parent;

        log::debug!(
            "Split leaf {}: {} + {} entries",
            leaf,
            groups.first.len(),
            groups.second.len()
        );
        let sibling = self.arena.allocate(Node::Leaf {
            parent,
            entries: new_entries,
        });
        Ok(Some(sibling))
    }

    /// Attach `child` to the internal node `node`, splitting it when it
    /// overflows. Returns the new sibling produced by a split.
    fn insert_child(&mut self, node: NodeId, child: NodeId) -> SpatialResult<Option<NodeId>> {
        let bbox = self.node_rectangle(child)?;
        let capacity = self.config.capacity;
        let variant = self.config.variant;
        let min_fill = self.min_fill;

        let (parent, level, new_children) = match self.arena.get_mut(node)? {
            Node::Internal {
                parent,
                children,
                level,
            } => {
                children.push(ChildRef { bbox, node: child });
                if children.len() <= capacity {
                    (*parent, *level, None)
                } else {
                    let boxes: Vec<BoundingBox> = children.iter().map(|c| c.bbox.clone()).collect();
                    let groups = match split_groups(variant, &boxes, min_fill) {
                        Ok(groups) => groups,
                        Err(err) => {
                            children.pop();
                            return Err(err);
                        }
                    };
                    let (remaining, moved) = distribute(std::mem::take(children), &groups);
                    *children = remaining;
                    (*parent, *level, Some(moved))
                }
            }
            Node::Leaf { .. } => {
                return Err(SpatialError::InvalidOperation(format!(
                    "cannot attach node {} to leaf {}",
                    child, node
                )));
            }
        };

        self.arena.get_mut(child)?.set_parent(Some(node));
        let Some(new_children) = new_children else {
            return Ok(None);
        };

        let moved_ids: Vec<NodeId> = new_children.iter().map(|c| c.node).collect();
        let sibling = self.arena.allocate(Node::Internal {
            parent,
            children: new_children,
            level,
        });
        for id in moved_ids {
            self.arena.get_mut(id)?.set_parent(Some(sibling));
        }

        log::debug!("Split internal node {} at level {}, new sibling {}", node, level, sibling);
        Ok(Some(sibling))
    }

    /// Propagate a change of `node` up to the root.
    ///
    /// Each ancestor refreshes the stored box of the child that changed. A
    /// split sibling is attached next to it, which may split the ancestor in
    /// turn; a split of the root grows the tree by one level.
    fn adjust_tree(&mut self, mut node: NodeId, mut split: Option<NodeId>) -> SpatialResult<()> {
        loop {
            let Some(parent) = self.arena.get(node)?.parent() else {
                if let Some(sibling) = split {
                    self.grow_root(node, sibling)?;
                }
                return Ok(());
            };

            self.refresh_child_bbox(parent, node)?;
            split = match split {
                Some(sibling) => self.insert_child(parent, sibling)?,
                None => None,
            };
            node = parent;
        }
    }

    /// Need to create new root
    fn grow_root(&mut self, old_root: NodeId, sibling: NodeId) -> SpatialResult<()> {
        let level = self.arena.get(old_root)?.level() + 1;
        let children = vec![
            ChildRef {
                bbox: self.node_rectangle(old_root)?,
                node: old_root,
            },
            ChildRef {
                bbox: self.node_rectangle(sibling)?,
                node: sibling,
            },
        ];

        let new_root = self.arena.allocate(Node::Internal {
            parent: None,
            children,
            level,
        });
        self.arena.get_mut(old_root)?.set_parent(Some(new_root));
        self.arena.get_mut(sibling)?.set_parent(Some(new_root));
        self.root = new_root;

        log::debug!("Root split, tree height is now {}", level);
        Ok(())
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Delete one entry exactly equal to `bbox`.
    ///
    /// Returns the slot the entry occupied in its leaf, or `None` if the tree
    /// holds no such entry.
    pub fn delete(&mut self, bbox: &BoundingBox) -> SpatialResult<Option<usize>> {
        self.check_dimension(bbox)?;

        let Some((leaf, slot)) = self.find_leaf(bbox)? else {
            log::trace!("Delete: {} not found", bbox);
            return Ok(None);
        };

        if let Node::Leaf { entries, .. } = self.arena.get_mut(leaf)? {
            entries.remove(slot);
        }
        self.entry_count = self.entry_count.saturating_sub(1);

        let evicted = self.condense_tree(leaf)?;
        self.reinsert(evicted)?;
        Ok(Some(slot))
    }

    /// Find the leaf holding an entry exactly equal to `bbox`.
    ///
    /// Only children whose box encloses `bbox` are searched, in slot order;
    /// every enclosing sibling is tried before giving up. Returns the leaf
    /// and the slot of the entry.
    pub fn find_leaf(&self, bbox: &BoundingBox) -> SpatialResult<Option<(NodeId, usize)>> {
        self.check_dimension(bbox)?;

        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            match self.arena.get(id)? {
                Node::Leaf { entries, .. } => {
                    if let Some(slot) = entries.iter().position(|e| e == bbox) {
                        return Ok(Some((id, slot)));
                    }
                }
                Node::Internal { children, .. } => {
                    // reversed so the first enclosing child is popped first
                    stack.extend(
                        children
                            .iter()
                            .rev()
                            .filter(|c| c.bbox.contains(bbox))
                            .map(|c| c.node),
                    );
                }
            }
        }
        Ok(None)
    }

    /// Walk from `start` to the root, detaching under-filled nodes and
    /// refreshing the stored boxes of the others. Returns the detached nodes.
    fn condense_tree(&mut self, start: NodeId) -> SpatialResult<Vec<NodeId>> {
        let mut evicted = Vec::new();
        let mut node = start;

        while let Some(parent) = self.arena.get(node)?.parent() {
            if self.arena.get(node)?.len() < self.min_fill {
                let slot = self.child_slot(parent, node)?;
                if let Node::Internal { children, .. } = self.arena.get_mut(parent)? {
                    children.remove(slot);
                }
                self.arena.get_mut(node)?.set_parent(None);
                evicted.push(node);
            } else {
                self.refresh_child_bbox(parent, node)?;
            }
            node = parent;
        }

        self.collapse_root()?;
        Ok(evicted)
    }

    /// Replace an internal root that has a single child by that child.
    fn collapse_root(&mut self) -> SpatialResult<()> {
        loop {
            let only_child = match self.arena.get(self.root)? {
                Node::Internal { children, .. } if children.len() == 1 => children[0].node,
                _ => return Ok(()),
            };

            self.arena.free(self.root)?;
            self.arena.get_mut(only_child)?.set_parent(None);
            self.root = only_child;
            log::debug!("Root collapsed, tree height is now {}", self.height());
        }
    }

    /// Reinsert the leaf-level payload of every evicted subtree.
    ///
    /// Entries are collected into a worklist and the evicted nodes are freed
    /// before any reinsertion starts.
    fn reinsert(&mut self, evicted: Vec<NodeId>) -> SpatialResult<()> {
        if evicted.is_empty() {
            return Ok(());
        }

        let mut worklist = Vec::new();
        for node in &evicted {
            for id in self.traverse_post_order(*node)? {
                if let Node::Leaf { entries, .. } = self.arena.free(id)? {
                    worklist.extend(entries);
                }
            }
        }

        log::debug!(
            "Reinserting {} entries from {} evicted nodes",
            worklist.len(),
            evicted.len()
        );
        for bbox in worklist {
            self.insert_entry(bbox)?;
        }
        Ok(())
    }

    // ========================================================================
    // Traversal and diagnostics
    // ========================================================================

    /// Collect `node` and all its descendants, children before parents.
    pub fn traverse_post_order(&self, node: NodeId) -> SpatialResult<Vec<NodeId>> {
        let mut order = Vec::new();
        let mut stack = vec![(node, false)];

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            for child in self.arena.get(id)?.child_ids().into_iter().rev() {
                stack.push((child, false));
            }
        }
        Ok(order)
    }

    pub fn stats(&self) -> SpatialResult<RTreeStats> {
        let nodes = self.traverse_post_order(self.root)?;
        let mut leaf_count = 0u64;
        let mut used = 0usize;
        for id in &nodes {
            let node = self.arena.get(*id)?;
            if node.is_leaf() {
                leaf_count += 1;
            }
            used += node.len();
        }

        let node_count = nodes.len() as u64;
        let fill_ratio = used as f64 / (nodes.len() * self.config.capacity) as f64;
        Ok(RTreeStats {
            total_entries: self.entry_count,
            node_count,
            leaf_count,
            tree_height: self.height(),
            fill_ratio,
        })
    }

    /// Verify the structural invariants of the whole tree.
    ///
    /// Checks occupancy bounds, tightness of every stored child box, uniform
    /// leaf depth, parent back-references, reachability of every allocated
    /// node and the cached entry count.
    pub fn check_integrity(&self) -> SpatialResult<IntegrityReport> {
        let mut report = IntegrityReport::new();
        let capacity = self.config.capacity;

        if self.arena.get(self.root)?.parent().is_some() {
            report.record(format!("root {} has a parent", self.root));
        }

        let mut leaf_entries = 0u64;
        let mut leaf_depth: Option<usize> = None;
        let mut stack = vec![(self.root, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            let node = match self.arena.get(id) {
                Ok(node) => node,
                Err(err) => {
                    report.record(err.to_string());
                    continue;
                }
            };
            report.nodes_checked += 1;

            let is_root = id == self.root;
            if node.len() > capacity {
                report.record(format!("node {} holds {} entries, capacity is {}", id, node.len(), capacity));
            }
            if !is_root && node.len() < self.min_fill {
                report.record(format!("node {} holds {} entries, minimum is {}", id, node.len(), self.min_fill));
            }

            match node {
                Node::Leaf { entries, .. } => {
                    leaf_entries += entries.len() as u64;
                    match leaf_depth {
                        None => leaf_depth = Some(depth),
                        Some(expected) if expected != depth => {
                            report.record(format!("leaf {} at depth {}, expected {}", id, depth, expected));
                        }
                        _ => {}
                    }
                    if let Some(e) = entries.iter().find(|e| e.dimension() != self.config.dimension) {
                        report.record(format!("leaf {} holds {} of wrong dimension", id, e));
                    }
                }
                Node::Internal {
                    children, level, ..
                } => {
                    if is_root && children.len() < 2 {
                        report.record(format!("internal root {} has {} children", id, children.len()));
                    }
                    for child in children {
                        let Ok(child_node) = self.arena.get(child.node) else {
                            report.record(format!("node {} references freed node {}", id, child.node));
                            continue;
                        };
                        if child_node.parent() != Some(id) {
                            report.record(format!(
                                "node {} has parent {:?}, expected {}",
                                child.node,
                                child_node.parent(),
                                id
                            ));
                        }
                        if child_node.level() + 1 != *level {
                            report.record(format!(
                                "node {} at level {} under level {}",
                                child.node,
                                child_node.level(),
                                level
                            ));
                        }
                        if child_node.compute_bbox().as_ref() != Some(&child.bbox) {
                            report.record(format!("stale box {} stored for node {}", child.bbox, child.node));
                        }
                        stack.push((child.node, depth + 1));
                    }
                }
            }
        }

        if report.nodes_checked != self.arena.len() as u64 {
            report.record(format!(
                "{} nodes allocated, {} reachable from the root",
                self.arena.len(),
                report.nodes_checked
            ));
        }
        if leaf_entries != self.entry_count {
            report.record(format!(
                "leaves hold {} entries, tree counts {}",
                leaf_entries, self.entry_count
            ));
        }
        Ok(report)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn check_dimension(&self, bbox: &BoundingBox) -> SpatialResult<()> {
        if bbox.dimension() != self.config.dimension {
            return Err(SpatialError::dimension_mismatch(
                self.config.dimension,
                bbox.dimension(),
            ));
        }
        Ok(())
    }

    /// Tight box of a node; the zero box for an empty node
    fn node_rectangle(&self, id: NodeId) -> SpatialResult<BoundingBox> {
        Ok(self
            .arena
            .get(id)?
            .compute_bbox()
            .unwrap_or_else(|| BoundingBox::zero(self.config.dimension)))
    }

    fn child_slot(&self, parent: NodeId, child: NodeId) -> SpatialResult<usize> {
        match self.arena.get(parent)? {
            Node::Internal { children, .. } => children
                .iter()
                .position(|c| c.node == child)
                .ok_or_else(|| {
                    SpatialError::InvalidOperation(format!(
                        "node {} is not a child of {}",
                        child, parent
                    ))
                }),
            Node::Leaf { .. } => Err(SpatialError::InvalidOperation(format!(
                "parent {} of node {} is a leaf",
                parent, child
            ))),
        }
    }

    fn refresh_child_bbox(&mut self, parent: NodeId, child: NodeId) -> SpatialResult<()> {
        let bbox = self.node_rectangle(child)?;
        let slot = self.child_slot(parent, child)?;
        if let Node::Internal { children, .. } = self.arena.get_mut(parent)? {
            children[slot].bbox = bbox;
        }
        Ok(())
    }
}

// ============================================================================
// Leaf Selection
// ============================================================================

/// Child whose box grows least when extended to `bbox`; ties go to the
/// smaller box, then to the first seen.
fn least_enlargement(children: &[ChildRef], bbox: &BoundingBox) -> Option<usize> {
    let mut best_idx = None;
    let mut best_enlargement = f64::INFINITY;
    let mut best_area = f64::INFINITY;

    for (i, child) in children.iter().enumerate() {
        let enlargement = child.bbox.enlargement(bbox);
        let area = child.bbox.area();

        if best_idx.is_none()
            || enlargement < best_enlargement
            || (enlargement == best_enlargement && area < best_area)
        {
            best_enlargement = enlargement;
            best_area = area;
            best_idx = Some(i);
        }
    }
    best_idx
}

/// Child whose box, once extended to `bbox`, overlaps its siblings least;
/// ties go to the smaller enlargement, then the smaller box, then the first
/// seen. Overlap is measured between child boxes, not between `bbox` and the
/// child's own entries.
fn least_overlap(children: &[ChildRef], bbox: &BoundingBox) -> Option<usize> {
    let mut best_idx = None;
    let mut best_overlap = f64::INFINITY;
    let mut best_enlargement = f64::INFINITY;
    let mut best_area = f64::INFINITY;

    for (i, child) in children.iter().enumerate() {
        let enlarged = child.bbox.merge(bbox);
        let overlap: f64 = children
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, other)| enlarged.overlap_area(&other.bbox))
            .sum();
        let area = child.bbox.area();
        let enlargement = enlarged.area() - area;

        let better = best_idx.is_none()
            || overlap < best_overlap
            || (overlap == best_overlap
                && (enlargement < best_enlargement
                    || (enlargement == best_enlargement && area < best_area)));
        if better {
            best_overlap = overlap;
            best_enlargement = enlargement;
            best_area = area;
            best_idx = Some(i);
        }
    }
    best_idx
}

// ============================================================================
// Tests
// ============================================================================
