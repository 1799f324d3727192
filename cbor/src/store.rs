/*!
Node storage, the allocation context of the decoder.

The decoder never allocates nodes itself: every node is handed to a
[`NodeStore`], and every node released by teardown is handed back. The default
[`Arena`] keeps nodes in a slot vector with an intrusive free list, so a
single arena can be reused for many decode/free cycles without touching the
global allocator again.
*/

use super::node::{Node, NodeId};
use alloc::vec::Vec;
use tracing::*;

pub trait NodeStore<'a> {
    /// Take ownership of `node`, or return `None` if no space is left.
    fn allocate(&mut self, node: Node<'a>) -> Option<NodeId>;

    /// Release a node previously returned by [`allocate`](Self::allocate).
    fn release(&mut self, id: NodeId);

    fn get(&self, id: NodeId) -> &Node<'a>;

    fn get_mut(&mut self, id: NodeId) -> &mut Node<'a>;
}

impl<'a, S> NodeStore<'a> for &mut S
where
    S: NodeStore<'a> + ?Sized,
{
    fn allocate(&mut self, node: Node<'a>) -> Option<NodeId> {
        (**self).allocate(node)
    }

    fn release(&mut self, id: NodeId) {
        (**self).release(id)
    }

    fn get(&self, id: NodeId) -> &Node<'a> {
        (**self).get(id)
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<'a> {
        (**self).get_mut(id)
    }
}

enum Slot<'a> {
    Occupied(Node<'a>),
    Vacant(Option<usize>),
}

#[derive(Default)]
pub struct Arena<'a> {
    slots: Vec<Slot<'a>>,
    free: Option<usize>,
    live: usize,
    limit: Option<usize>,
}

impl<'a> Arena<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// An arena that refuses to hold more than `limit` live nodes at once.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Number of nodes currently allocated
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of slots ever allocated, live or free
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<'a> NodeStore<'a> for Arena<'a> {
    fn allocate(&mut self, node: Node<'a>) -> Option<NodeId> {
        if let Some(limit) = self.limit
            && self.live >= limit
        {
            trace!("Node arena limit of {limit} reached");
            return None;
        }

        let idx = match self.free {
            Some(idx) => {
                let Slot::Vacant(next) = self.slots[idx] else {
                    unreachable!("Free list points at an occupied slot")
                };
                self.free = next;
                self.slots[idx] = Slot::Occupied(node);
                idx
            }
            None => {
                self.slots.try_reserve(1).ok()?;
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        };
        self.live += 1;
        Some(NodeId(idx))
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot @ Slot::Occupied(_)) = self.slots.get_mut(id.0) {
            *slot = Slot::Vacant(self.free);
            self.free = Some(id.0);
            self.live -= 1;
        }
    }

    fn get(&self, id: NodeId) -> &Node<'a> {
        match &self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => panic!("Use of released node {id:?}"),
        }
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node<'a> {
        match &mut self.slots[id.0] {
            Slot::Occupied(node) => node,
            Slot::Vacant(_) => panic!("Use of released node {id:?}"),
        }
    }
}
