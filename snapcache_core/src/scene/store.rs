// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and property management.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::Affine;

use super::behavior::Bindings;
use super::content::Content;
use super::id::{INVALID, NodeId};
use super::traverse::Children;
use crate::cache::CacheSlot;
use crate::effect::Effect;
use crate::trace::{TraceSink, Tracer};

/// Per-node boolean flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeFlags {
    /// Whether the node (and its subtree) is drawn and measured.
    pub visible: bool,
    /// Whether the node draws at all. Unlike `visible`, a non-renderable
    /// node still contributes to bounds and hit tests.
    pub renderable: bool,
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self {
            visible: true,
            renderable: true,
        }
    }
}

/// Struct-of-arrays storage for all nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// `S` is the offscreen surface type of the backend the scene renders
/// through; cached nodes own one surface each.
#[derive(Debug)]
pub struct SceneStore<S> {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Local properties (set by callers) --
    pub(crate) local_transform: Vec<Affine>,
    pub(crate) alpha: Vec<f32>,
    pub(crate) flags: Vec<NodeFlags>,
    pub(crate) content: Vec<Option<Content>>,
    pub(crate) effects: Vec<Vec<Effect>>,

    // -- Computed properties (written by transform updates) --
    pub(crate) world_transform: Vec<Affine>,
    pub(crate) world_alpha: Vec<f32>,

    // -- Behavior and caching --
    pub(crate) bindings: Vec<Bindings>,
    pub(crate) cache: Vec<CacheSlot<S>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    pub(crate) tracer: Tracer,
}

impl<S> Default for SceneStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> SceneStore<S> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            local_transform: Vec::new(),
            alpha: Vec::new(),
            flags: Vec::new(),
            content: Vec::new(),
            effects: Vec::new(),
            world_transform: Vec::new(),
            world_alpha: Vec::new(),
            bindings: Vec::new(),
            cache: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            tracer: Tracer::none(),
        }
    }

    /// Installs a sink for cache lifecycle events.
    ///
    /// Events are only delivered when the `trace` feature is enabled.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer = Tracer::new(sink);
    }

    /// Removes and returns the installed trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.tracer.take_sink()
    }

    // -- Allocation API --

    /// Creates a new node and returns its handle.
    ///
    /// The node starts visible and renderable, with an identity transform,
    /// full alpha, no content, no effects, default bindings, and no parent.
    pub fn create_node(&mut self) -> NodeId {
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.local_transform[i] = Affine::IDENTITY;
            self.alpha[i] = 1.0;
            self.flags[i] = NodeFlags::default();
            self.content[i] = None;
            self.effects[i].clear();
            self.world_transform[i] = Affine::IDENTITY;
            self.world_alpha[i] = 1.0;
            self.bindings[i] = Bindings::DEFAULT;
            self.cache[i] = CacheSlot::default();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.local_transform.push(Affine::IDENTITY);
            self.alpha.push(1.0);
            self.flags.push(NodeFlags::default());
            self.content.push(None);
            self.effects.push(Vec::new());
            self.world_transform.push(Affine::IDENTITY);
            self.world_alpha.push(1.0);
            self.bindings.push(Bindings::DEFAULT);
            self.cache.push(CacheSlot::default());
            self.generation.push(0);
            idx
        };

        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// World transforms are not recomputed until the next transform update.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, or
    /// if `parent` is `child` or one of its descendants.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] == INVALID,
            "child already has a parent"
        );
        assert!(
            !self.is_ancestor_or_self(child.idx, parent.idx),
            "cannot add a node under its own subtree"
        );
        self.link_last(parent.idx, child.idx);
    }

    /// Removes `child` from its current parent, making it a root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        assert!(
            self.parent[child.idx as usize] != INVALID,
            "node has no parent"
        );
        self.unlink_from_parent(child.idx);
    }

    /// Moves `child` to be the last child of `new_parent`.
    ///
    /// If `child` already has a parent, it is removed first.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `new_parent` is `child` or one
    /// of its descendants.
    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) {
        self.validate(child);
        self.validate(new_parent);
        assert!(
            !self.is_ancestor_or_self(child.idx, new_parent.idx),
            "cannot add a node under its own subtree"
        );
        if self.parent[child.idx as usize] != INVALID {
            self.unlink_from_parent(child.idx);
        }
        self.link_last(new_parent.idx, child.idx);
    }

    /// Inserts `child` before `sibling` in the sibling list.
    ///
    /// `child` must not already have a parent. `sibling` must have a parent.
    ///
    /// # Panics
    ///
    /// Panics if handles are stale, `child` already has a parent, `sibling`
    /// has no parent, or the insertion would create a cycle.
    pub fn insert_before(&mut self, child: NodeId, sibling: NodeId) {
        self.validate(child);
        self.validate(sibling);
        let c = child.idx;
        let s = sibling.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        let p = self.parent[s as usize];
        assert!(p != INVALID, "sibling has no parent");
        assert!(
            !self.is_ancestor_or_self(c, p),
            "cannot add a node under its own subtree"
        );

        self.parent[c as usize] = p;
        self.next_sibling[c as usize] = s;
        self.prev_sibling[c as usize] = self.prev_sibling[s as usize];

        if self.prev_sibling[s as usize] != INVALID {
            self.next_sibling[self.prev_sibling[s as usize] as usize] = c;
        } else {
            self.first_child[p as usize] = c;
        }
        self.prev_sibling[s as usize] = c;
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.handle(p))
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(
            &self.next_sibling,
            &self.generation,
            self.first_child[id.idx as usize],
        )
    }

    /// Returns all live nodes without a parent, in slot order.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.parent[idx as usize] == INVALID && !self.free_list.contains(&idx))
            .map(|idx| self.handle(idx))
            .collect()
    }

    // -- Property getters --

    /// Returns the local transform of a node.
    #[must_use]
    pub fn local_transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// Returns the local alpha of a node.
    #[must_use]
    pub fn alpha(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.alpha[id.idx as usize]
    }

    /// Returns the flags of a node.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns the content of a node.
    #[must_use]
    pub fn content(&self, id: NodeId) -> Option<Content> {
        self.validate(id);
        self.content[id.idx as usize]
    }

    /// Returns the effects attached to a node, outermost first.
    #[must_use]
    pub fn effects(&self, id: NodeId) -> &[Effect] {
        self.validate(id);
        &self.effects[id.idx as usize]
    }

    /// Returns the computed world transform of a node.
    ///
    /// Only meaningful after a transform update has reached the node.
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Affine {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Returns the computed world alpha of a node.
    #[must_use]
    pub fn world_alpha(&self, id: NodeId) -> f32 {
        self.validate(id);
        self.world_alpha[id.idx as usize]
    }

    /// Returns the behavior bindings currently in effect for a node.
    ///
    /// While the node is cached these are the cache-layer bindings, not the
    /// originals set by [`set_bindings`](Self::set_bindings).
    #[must_use]
    pub fn bindings(&self, id: NodeId) -> Bindings {
        self.validate(id);
        self.bindings[id.idx as usize]
    }

    // -- Mutation API --

    /// Sets the local transform of a node.
    pub fn set_transform(&mut self, id: NodeId, transform: Affine) {
        self.validate(id);
        self.local_transform[id.idx as usize] = transform;
    }

    /// Sets the local alpha of a node.
    pub fn set_alpha(&mut self, id: NodeId, alpha: f32) {
        self.validate(id);
        self.alpha[id.idx as usize] = alpha;
    }

    /// Sets the flags of a node.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
    }

    /// Shows or hides a node and its subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.validate(id);
        self.flags[id.idx as usize].visible = visible;
    }

    /// Sets whether a node draws.
    pub fn set_renderable(&mut self, id: NodeId, renderable: bool) {
        self.validate(id);
        self.flags[id.idx as usize].renderable = renderable;
    }

    /// Sets the content of a node.
    pub fn set_content(&mut self, id: NodeId, content: Option<Content>) {
        self.validate(id);
        self.content[id.idx as usize] = content;
    }

    /// Replaces the effects attached to a node.
    pub fn set_effects(&mut self, id: NodeId, effects: Vec<Effect>) {
        self.validate(id);
        self.effects[id.idx as usize] = effects;
    }

    /// Appends an effect to a node.
    pub fn push_effect(&mut self, id: NodeId, effect: Effect) {
        self.validate(id);
        self.effects[id.idx as usize].push(effect);
    }

    /// Installs behavior bindings for a node.
    ///
    /// While the node is cached, this replaces the saved originals that will
    /// be reinstated when caching ends. Behaviors the cache layer has not
    /// intercepted yet take effect immediately.
    pub fn set_bindings(&mut self, id: NodeId, bindings: Bindings) {
        self.validate(id);
        let i = id.idx as usize;
        let slot = &mut self.cache[i];
        let Some(saved) = slot.saved.as_mut() else {
            self.bindings[i] = bindings;
            return;
        };
        *saved = bindings;
        if slot.proxy.is_none() {
            let live = &mut self.bindings[i];
            live.update_transform = bindings.update_transform;
            live.bounds = bindings.bounds;
            live.hit_test = bindings.hit_test;
        }
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Returns the current handle for a live slot.
    pub(crate) fn handle(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Whether `ancestor` is `idx` or lies on the path from `idx` to its root.
    fn is_ancestor_or_self(&self, ancestor: u32, mut idx: u32) -> bool {
        while idx != INVALID {
            if idx == ancestor {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    /// Appends `c` to `p`'s child list. `c` must be detached.
    fn link_last(&mut self, p: u32, c: u32) {
        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }
    }

    /// Removes `idx` from its parent's child list.
    pub(crate) fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }

        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }
}
