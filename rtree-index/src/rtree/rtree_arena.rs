//! Node arena for the R-Tree.
//!
//! Every node of a tree lives in one slot of the arena and is addressed by
//! its [`NodeId`]. Parent and child links are plain ids, so the arena is the
//! only owner of node memory. Freed slots are kept on a free list and handed
//! out again before the arena grows.

use super::rtree_types::{Node, NodeId, SpatialError, SpatialResult};

#[derive(Debug, Default)]
pub struct NodeArena {
    /// Node storage - `None` marks a freed slot
    slots: Vec<Option<Node>>,
    /// Freed slots available for reuse
    free_slots: Vec<NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a node, reusing a freed slot when one is available.
    pub fn allocate(&mut self, node: Node) -> NodeId {
        if let Some(id) = self.free_slots.pop() {
            self.slots[id] = Some(node);
            return id;
        }
        self.slots.push(Some(node));
        self.slots.len() - 1
    }

    /// Removes a node and returns it; the slot becomes reusable.
    pub fn free(&mut self, id: NodeId) -> SpatialResult<Node> {
        let node = self
            .slots
            .get_mut(id)
            .and_then(Option::take)
            .ok_or_else(|| SpatialError::dangling(id))?;
        self.free_slots.push(id);
        Ok(node)
    }

    pub fn get(&self, id: NodeId) -> SpatialResult<&Node> {
        self.slots
            .get(id)
            .and_then(Option::as_ref)
            .ok_or_else(|| SpatialError::dangling(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> SpatialResult<&mut Node> {
        self.slots
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or_else(|| SpatialError::dangling(id))
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_slots.clear();
    }
}
