//! The time-ordered event timeline.
//!
//! A timeline is a sorted chain of event nodes, one node per occupied tick,
//! each holding a keyed collection of payloads that fire on that instant.
//! Nodes live in a slotmap arena and link to their neighbors by arena key,
//! so removal splices the neighbors together without any dangling reference.

use alloc::collections::BTreeMap;
use slotmap::SlotMap;

use crate::event::{Keyed, Tick};
use crate::ModelError;

slotmap::new_key_type! {
    /// Key for event nodes in a timeline's arena.
    pub struct NodeKey;
}

/// One position on the timeline: a tick and every payload firing on it.
#[derive(Clone, Debug)]
pub struct EventNode<P> {
    time: Tick,
    payloads: BTreeMap<u8, P>,
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

impl<P: Keyed> EventNode<P> {
    fn new(time: Tick, payload: P) -> Self {
        let mut payloads = BTreeMap::new();
        payloads.insert(payload.key(), payload);
        Self {
            time,
            payloads,
            prev: None,
            next: None,
        }
    }

    /// The tick this node fires on.
    pub fn time(&self) -> Tick {
        self.time
    }

    /// Look up a payload by key.
    pub fn get(&self, key: u8) -> Option<&P> {
        self.payloads.get(&key)
    }

    /// Iterate the payloads on this tick in key order.
    pub fn payloads(&self) -> impl Iterator<Item = &P> {
        self.payloads.values()
    }

    /// Number of payloads on this tick. Never zero for a linked node.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Returns true if the node holds no payloads.
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

/// A traversal position into a timeline.
///
/// Cursors are minted by [`Timeline::cursor`] and [`Timeline::seek`] and
/// carry the timeline generation they were minted at. A structural edit
/// (node created or destroyed) stales every outstanding cursor; a stale
/// cursor yields nothing until re-minted.
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    node: Option<NodeKey>,
    generation: u64,
}

impl Cursor {
    /// Returns true if the cursor has run past the last node.
    pub fn is_exhausted(&self) -> bool {
        self.node.is_none()
    }
}

/// A sorted timeline of event nodes, keyed by tick.
///
/// Owns every node. Insertion merges payloads that land on an occupied
/// tick; removing the last payload on a tick destroys its node. Times are
/// strictly increasing along the chain, so equal times are never
/// represented as separate nodes.
#[derive(Clone, Debug)]
pub struct Timeline<P> {
    nodes: SlotMap<NodeKey, EventNode<P>>,
    head: Option<NodeKey>,
    generation: u64,
}

impl<P: Keyed> Timeline<P> {
    /// Create a new empty timeline.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            generation: 0,
        }
    }

    /// Number of occupied ticks (nodes) on the timeline.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the timeline has no events.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert a payload at `time`.
    ///
    /// If a node already exists on that tick the payload is merged into it:
    /// an existing payload with the same key is overwritten in place,
    /// otherwise the payload is added beside the others. Never fails.
    pub fn insert(&mut self, time: Tick, payload: P) {
        if let Some(key) = self.node_key_at(time) {
            self.nodes[key].payloads.insert(payload.key(), payload);
            return;
        }

        let new_key = self.nodes.insert(EventNode::new(time, payload));

        // The node the new one goes after: the last node with a smaller
        // time, or None when the new node becomes the head.
        let mut after = None;
        let mut walk = self.head;
        while let Some(k) = walk {
            if self.nodes[k].time > time {
                break;
            }
            after = Some(k);
            walk = self.nodes[k].next;
        }

        match after {
            None => {
                self.nodes[new_key].next = self.head;
                if let Some(old_head) = self.head {
                    self.nodes[old_head].prev = Some(new_key);
                }
                self.head = Some(new_key);
            }
            Some(prior) => {
                let following = self.nodes[prior].next;
                self.nodes[new_key].prev = Some(prior);
                self.nodes[new_key].next = following;
                self.nodes[prior].next = Some(new_key);
                if let Some(f) = following {
                    self.nodes[f].prev = Some(new_key);
                }
            }
        }

        self.generation += 1;
    }

    /// Remove the payload with `key` at exactly `time`.
    ///
    /// Removing the last payload on a tick destroys its node. Nothing to
    /// remove is a normal no-op: the playback engine routinely probes
    /// positions that may be empty.
    pub fn remove(&mut self, time: Tick, key: u8) {
        let node_key = match self.node_key_at(time) {
            Some(k) => k,
            None => return,
        };
        if self.nodes[node_key].payloads.remove(&key).is_none() {
            return;
        }
        if self.nodes[node_key].payloads.is_empty() {
            self.unlink(node_key);
        }
    }

    /// Find the payload for `key` at the first node at or after `time`.
    ///
    /// Playback resolves the next action relative to an arbitrary elapsed
    /// tick, so this is an at-or-after lookup, not an exact-time one.
    /// Returns `None` when `time` is past the last node or the resolved
    /// node has no payload for `key`.
    pub fn find(&self, time: Tick, key: u8) -> Option<&P> {
        self.at_or_after(time)
            .and_then(|k| self.nodes[k].payloads.get(&key))
    }

    /// Move the payload identified by `(from, key)` to `to`, preserving its
    /// non-key fields.
    ///
    /// Landing on an occupied tick merges into that node's collection
    /// rather than creating a second node on the same tick. If there is no
    /// payload with `key` at exactly `from`, returns
    /// [`ModelError::NotFound`] and leaves the timeline unmodified.
    pub fn move_to(&mut self, from: Tick, to: Tick, key: u8) -> Result<(), ModelError> {
        let node_key = match self.node_key_at(from) {
            Some(k) => k,
            None => return Err(ModelError::NotFound),
        };
        let payload = match self.nodes[node_key].payloads.remove(&key) {
            Some(p) => p,
            None => return Err(ModelError::NotFound),
        };
        if self.nodes[node_key].payloads.is_empty() {
            self.unlink(node_key);
        }
        self.insert(to, payload);
        Ok(())
    }

    /// A cursor at the current head of the timeline.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            node: self.head,
            generation: self.generation,
        }
    }

    /// A cursor at the first node at or after `time`.
    ///
    /// Resynchronizes traversal after a transport jump, or after a
    /// structural edit staled the previous cursor.
    pub fn seek(&self, time: Tick) -> Cursor {
        Cursor {
            node: self.at_or_after(time),
            generation: self.generation,
        }
    }

    /// Step the cursor forward, returning the node it was on.
    ///
    /// Returns `None` once the cursor is past the last node. A cursor
    /// minted before a structural edit is stale and also yields `None`;
    /// re-mint it with [`Timeline::seek`] or [`Timeline::cursor`].
    pub fn advance(&self, cursor: &mut Cursor) -> Option<&EventNode<P>> {
        if cursor.generation != self.generation {
            return None;
        }
        let key = cursor.node?;
        let node = self.nodes.get(key)?;
        cursor.node = node.next;
        Some(node)
    }

    /// The node at exactly `time`, if that tick is occupied.
    pub fn node_at(&self, time: Tick) -> Option<&EventNode<P>> {
        self.node_key_at(time).map(|k| &self.nodes[k])
    }

    /// Iterate the nodes in time order.
    pub fn iter(&self) -> Nodes<'_, P> {
        Nodes {
            timeline: self,
            next: self.head,
        }
    }

    /// Destroy every node, returning the timeline to its just-created state.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.generation += 1;
    }

    /// Arena key of the node at exactly `time`. The chain is sorted, so the
    /// scan stops at the first later tick.
    fn node_key_at(&self, time: Tick) -> Option<NodeKey> {
        let mut walk = self.head;
        while let Some(k) = walk {
            let node = &self.nodes[k];
            if node.time == time {
                return Some(k);
            }
            if node.time > time {
                return None;
            }
            walk = node.next;
        }
        None
    }

    /// Arena key of the first node at or after `time`.
    fn at_or_after(&self, time: Tick) -> Option<NodeKey> {
        let mut walk = self.head;
        while let Some(k) = walk {
            if self.nodes[k].time >= time {
                return Some(k);
            }
            walk = self.nodes[k].next;
        }
        None
    }

    /// Splice a node out of the chain and destroy it.
    fn unlink(&mut self, key: NodeKey) {
        let (prev, next) = {
            let node = &self.nodes[key];
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        if let Some(n) = next {
            self.nodes[n].prev = prev;
        }
        self.nodes.remove(key);
        self.generation += 1;
    }
}

impl<P: Keyed> Default for Timeline<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered iterator over a timeline's nodes.
pub struct Nodes<'a, P> {
    timeline: &'a Timeline<P>,
    next: Option<NodeKey>,
}

impl<'a, P: Keyed> Iterator for Nodes<'a, P> {
    type Item = &'a EventNode<P>;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.next?;
        let node = &self.timeline.nodes[key];
        self.next = node.next;
        Some(node)
    }
}
