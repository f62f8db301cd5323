// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Behavior dispatch: transform updates, rendering, bounds, hit testing and
//! destruction, each routed through the node's [`Bindings`](super::Bindings).

use kurbo::{Affine, Point, Rect};

use super::behavior::{BoundsBehavior, HitTestBehavior, RenderBehavior, TransformBehavior};
use super::id::{INVALID, NodeId};
use super::store::SceneStore;
use crate::backend::{OffscreenSurface, RenderBackend};
use crate::cache::CacheSlot;

impl<S: OffscreenSurface> SceneStore<S> {
    // -- Transforms --

    /// Recomputes world transforms and world alphas from every root down,
    /// each node through its own transform binding.
    pub fn update_transforms(&mut self) {
        for root in self.roots() {
            self.update_transform_at(root.idx);
        }
    }

    /// Runs the transform binding of one node.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn update_transform(&mut self, id: NodeId) {
        self.validate(id);
        self.update_transform_at(id.idx);
    }

    pub(crate) fn update_transform_at(&mut self, idx: u32) {
        match self.bindings[idx as usize].update_transform {
            TransformBehavior::Subtree => {
                self.update_local_at(idx);
                self.update_children_at(idx);
            }
            TransformBehavior::Local => self.update_local_at(idx),
        }
    }

    /// Derives this node's world transform and alpha from its parent's.
    fn update_local_at(&mut self, idx: u32) {
        let i = idx as usize;
        let p = self.parent[i];
        let (parent_world, parent_alpha) = if p == INVALID {
            (Affine::IDENTITY, 1.0)
        } else {
            (self.world_transform[p as usize], self.world_alpha[p as usize])
        };
        let world = parent_world * self.local_transform[i];
        self.world_transform[i] = world;
        self.world_alpha[i] = parent_alpha * self.alpha[i];
        if let Some(proxy) = self.cache[i].proxy.as_mut() {
            proxy.set_world_transform(world);
        }
    }

    /// Runs each child's transform binding against this node's current
    /// world state.
    pub(crate) fn update_children_at(&mut self, idx: u32) {
        let mut c = self.first_child[idx as usize];
        while c != INVALID {
            self.update_transform_at(c);
            c = self.next_sibling[c as usize];
        }
    }

    // -- Rendering --

    /// Renders every root, in slot order.
    pub fn render_roots<B>(&mut self, backend: &mut B)
    where
        B: RenderBackend<Surface = S>,
    {
        for root in self.roots() {
            self.render_at(root.idx, backend);
        }
    }

    /// Renders one node through its render binding.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn render<B>(&mut self, id: NodeId, backend: &mut B)
    where
        B: RenderBackend<Surface = S>,
    {
        self.validate(id);
        self.render_at(id.idx, backend);
    }

    pub(crate) fn render_at<B>(&mut self, idx: u32, backend: &mut B)
    where
        B: RenderBackend<Surface = S>,
    {
        match self.bindings[idx as usize].render {
            RenderBehavior::Subtree => self.render_subtree_at(idx, backend),
            RenderBehavior::Cached => self.render_cached_at(idx, backend),
        }
    }

    /// Whether the node would draw anything this frame.
    pub(crate) fn is_drawable(&self, idx: u32) -> bool {
        let i = idx as usize;
        let flags = self.flags[i];
        flags.visible && flags.renderable && self.world_alpha[i] > 0.0
    }

    /// Draws own content, then each child through its binding, inside the
    /// node's effects.
    pub(crate) fn render_subtree_at<B>(&mut self, idx: u32, backend: &mut B)
    where
        B: RenderBackend<Surface = S>,
    {
        if !self.is_drawable(idx) {
            return;
        }
        let i = idx as usize;
        for effect in &self.effects[i] {
            backend.push_filter(effect);
        }
        if let Some(content) = self.content[i] {
            backend.fill(
                &content.geometry,
                self.world_transform[i],
                content.color,
                self.world_alpha[i],
            );
        }
        let mut c = self.first_child[i];
        while c != INVALID {
            self.render_at(c, backend);
            c = self.next_sibling[c as usize];
        }
        for _ in 0..self.effects[i].len() {
            backend.pop_filter();
        }
    }

    // -- Bounds --

    /// Returns the world-space bounds reported by the node's bounds binding.
    ///
    /// A subtree with nothing visible to measure reports [`Rect::ZERO`].
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn bounds(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.bounds_at(id.idx)
    }

    pub(crate) fn bounds_at(&self, idx: u32) -> Rect {
        self.measure_at(idx).unwrap_or(Rect::ZERO)
    }

    fn measure_at(&self, idx: u32) -> Option<Rect> {
        let i = idx as usize;
        match (self.bindings[i].bounds, &self.cache[i].proxy) {
            (BoundsBehavior::Proxy, Some(proxy)) => {
                proxy.invalidate_bounds();
                Some(proxy.bounds())
            }
            _ => self.measure_subtree_at(idx),
        }
    }

    /// Measures the node's own content and children, ignoring its proxy.
    pub(crate) fn measure_subtree_at(&self, idx: u32) -> Option<Rect> {
        let i = idx as usize;
        let mut bounds = self.content[i].map(|content| {
            self.world_transform[i].transform_rect_bbox(content.geometry.bounding_box())
        });
        let mut c = self.first_child[i];
        while c != INVALID {
            if self.flags[c as usize].visible
                && let Some(child) = self.measure_at(c)
            {
                bounds = Some(bounds.map_or(child, |b| b.union(child)));
            }
            c = self.next_sibling[c as usize];
        }
        bounds
    }

    // -- Hit testing --

    /// Whether world-space `point` hits the node, per its hit-test binding.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn contains_point(&self, id: NodeId, point: Point) -> bool {
        self.validate(id);
        self.contains_point_at(id.idx, point)
    }

    pub(crate) fn contains_point_at(&self, idx: u32, point: Point) -> bool {
        let i = idx as usize;
        match self.bindings[i].hit_test {
            HitTestBehavior::Disabled => false,
            HitTestBehavior::Content => self.content_contains(idx, point),
            HitTestBehavior::Proxy => match &self.cache[i].proxy {
                Some(proxy) => proxy.contains_point(point),
                None => self.subtree_contains(idx, point),
            },
            HitTestBehavior::Subtree => self.subtree_contains(idx, point),
        }
    }

    fn content_contains(&self, idx: u32, point: Point) -> bool {
        let i = idx as usize;
        self.content[i].is_some_and(|content| {
            let local = self.world_transform[i].inverse() * point;
            content.geometry.contains(local)
        })
    }

    fn subtree_contains(&self, idx: u32, point: Point) -> bool {
        if self.content_contains(idx, point) {
            return true;
        }
        let mut c = self.first_child[idx as usize];
        while c != INVALID {
            if self.flags[c as usize].visible && self.contains_point_at(c, point) {
                return true;
            }
            c = self.next_sibling[c as usize];
        }
        false
    }

    // -- Destruction --

    /// Destroys a node and its whole subtree, each node through its destroy
    /// binding.
    ///
    /// Returns `false` (and does nothing) if the handle is stale.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.destroy_at(id.idx);
        true
    }

    /// Destroys children first, then frees the slot.
    pub(crate) fn release_subtree_at(&mut self, idx: u32) {
        loop {
            let c = self.first_child[idx as usize];
            if c == INVALID {
                break;
            }
            self.destroy_at(c);
        }
        self.free_slot(idx);
    }

    /// Frees a childless slot.
    fn free_slot(&mut self, idx: u32) {
        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }
        self.release_proxy(idx);
        let i = idx as usize;
        self.cache[i] = CacheSlot::default();
        self.content[i] = None;
        self.effects[i].clear();

        // Bump generation so old handles immediately fail validation.
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.free_list.push(idx);
    }
}
