// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The cache mode state machine.

use super::{CacheMode, CachedProxy};
use crate::backend::OffscreenSurface;
use crate::scene::{DestroyBehavior, NodeId, RenderBehavior, SceneStore};
use crate::trace::{CacheModeEvent, SurfaceReleasedEvent};

impl<S: OffscreenSurface> SceneStore<S> {
    /// Switches a node between normal and cached rendering.
    ///
    /// Setting the mode the node is already in does nothing. Entering
    /// [`CacheMode::Cached`] saves the node's bindings and redirects its
    /// render and destroy behaviors; the snapshot itself is deferred to the
    /// node's next render. Leaving it releases the snapshot, if one was taken,
    /// and reinstates the saved bindings.
    ///
    /// A stale handle is ignored.
    pub fn set_cache_mode(&mut self, id: NodeId, mode: CacheMode) {
        if !self.is_alive(id) {
            return;
        }
        self.set_cache_mode_at(id.idx, mode);
    }

    /// Boolean form of [`set_cache_mode`](Self::set_cache_mode).
    pub fn set_cached(&mut self, id: NodeId, enabled: bool) {
        self.set_cache_mode(id, CacheMode::from_enabled(enabled));
    }

    /// Returns the node's cache mode.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn cache_mode(&self, id: NodeId) -> CacheMode {
        self.validate(id);
        self.cache[id.idx as usize].mode
    }

    /// Whether the node is in [`CacheMode::Cached`].
    #[must_use]
    pub fn is_cached(&self, id: NodeId) -> bool {
        self.cache_mode(id) == CacheMode::Cached
    }

    /// Returns the node's proxy, once a cached render has created it.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn cached_proxy(&self, id: NodeId) -> Option<&CachedProxy<S>> {
        self.validate(id);
        self.cache[id.idx as usize].proxy.as_ref()
    }

    /// Releases the node's snapshot without leaving cached mode.
    ///
    /// The next render takes a fresh snapshot. Until then the node measures
    /// and hit-tests like its uncached subtree. Does nothing if there is no
    /// snapshot.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn release_cache(&mut self, id: NodeId) {
        self.validate(id);
        self.release_cache_at(id.idx);
    }

    pub(crate) fn set_cache_mode_at(&mut self, idx: u32, mode: CacheMode) {
        let i = idx as usize;
        if self.cache[i].mode == mode {
            return;
        }
        self.cache[i].mode = mode;

        match mode {
            CacheMode::Cached => {
                let live = &mut self.bindings[i];
                self.cache[i].saved = Some(*live);
                live.render = RenderBehavior::Cached;
                live.destroy = DestroyBehavior::Uncache;
            }
            CacheMode::Normal => {
                self.release_cache_at(idx);
                if let Some(saved) = self.cache[i].saved.take() {
                    let live = &mut self.bindings[i];
                    live.render = saved.render;
                    live.destroy = saved.destroy;
                }
            }
        }

        let node = self.handle(idx);
        self.tracer.cache_mode(&CacheModeEvent { node, mode });
    }

    /// Releases the proxy and reinstates the bindings it intercepted.
    pub(crate) fn release_cache_at(&mut self, idx: u32) {
        let i = idx as usize;
        if !self.release_proxy(idx) {
            return;
        }
        if let Some(saved) = self.cache[i].saved {
            let live = &mut self.bindings[i];
            live.update_transform = saved.update_transform;
            live.bounds = saved.bounds;
            live.hit_test = saved.hit_test;
        }
    }

    /// Destroys the proxy's surface. Returns whether there was one.
    pub(crate) fn release_proxy(&mut self, idx: u32) -> bool {
        let Some(proxy) = self.cache[idx as usize].proxy.take() else {
            return false;
        };
        let surface = proxy.surface();
        let (width, height) = (surface.width(), surface.height());
        proxy.release();
        let node = self.handle(idx);
        self.tracer.surface_released(&SurfaceReleasedEvent {
            node,
            width,
            height,
        });
        true
    }

    /// Runs the node's destroy binding.
    pub(crate) fn destroy_at(&mut self, idx: u32) {
        let i = idx as usize;
        match (self.bindings[i].destroy, self.cache[i].mode) {
            (DestroyBehavior::Uncache, CacheMode::Cached) => {
                self.set_cache_mode_at(idx, CacheMode::Normal);
                self.destroy_at(idx);
            }
            _ => self.release_subtree_at(idx),
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Affine, Point, Rect};

    use super::*;
    use crate::scene::{
        Bindings, BoundsBehavior, Color, Content, Geometry, HitTestBehavior, TransformBehavior,
    };
    use crate::testing::{ContextBackend, StackBackend, TestSurface};

    type Store = SceneStore<TestSurface>;

    fn scene() -> (Store, NodeId) {
        let mut store = Store::new();
        let node = store.create_node();
        store.set_content(
            node,
            Some(Content::fill(
                Geometry::Rect(Rect::new(0.0, 0.0, 8.0, 8.0)),
                Color::WHITE,
            )),
        );
        store.update_transforms();
        (store, node)
    }

    #[test]
    fn enabling_defers_allocation() {
        let (mut store, node) = scene();
        store.set_cache_mode(node, CacheMode::Cached);
        assert!(store.is_cached(node));
        assert!(store.cached_proxy(node).is_none(), "no snapshot before render");
        let live = store.bindings(node);
        assert_eq!(live.render, RenderBehavior::Cached);
        assert_eq!(live.destroy, DestroyBehavior::Uncache);
        assert_eq!(live.update_transform, TransformBehavior::Subtree);
        assert_eq!(live.bounds, BoundsBehavior::Subtree);
        assert_eq!(live.hit_test, HitTestBehavior::Subtree);
    }

    #[test]
    fn enabling_twice_is_idempotent() {
        let (mut store, node) = scene();
        store.set_cache_mode(node, CacheMode::Cached);
        let once = store.bindings(node);
        let saved_once = store.cache[node.idx as usize].saved;
        store.set_cache_mode(node, CacheMode::Cached);
        assert_eq!(store.bindings(node), once);
        assert_eq!(store.cache[node.idx as usize].saved, saved_once);

        let mut backend = StackBackend::new();
        store.render(node, &mut backend);
        let rendered = store.bindings(node);
        store.set_cached(node, true);
        assert_eq!(store.bindings(node), rendered);
        assert_eq!(backend.rec.allocations.len(), 1);
    }

    #[test]
    fn disabling_normal_node_is_a_no_op() {
        let (mut store, node) = scene();
        store.set_cache_mode(node, CacheMode::Normal);
        assert_eq!(store.bindings(node), Bindings::DEFAULT);
        assert!(store.cache[node.idx as usize].saved.is_none());
    }

    #[test]
    fn round_trip_before_render_restores_bindings() {
        let (mut store, node) = scene();
        let custom = Bindings {
            hit_test: HitTestBehavior::Content,
            ..Bindings::DEFAULT
        };
        store.set_bindings(node, custom);
        store.set_cached(node, true);
        store.set_cached(node, false);
        assert_eq!(store.bindings(node), custom);
        assert!(store.cache[node.idx as usize].saved.is_none());
    }

    #[test]
    fn round_trip_after_render_restores_bindings() {
        let (mut store, node) = scene();
        let custom = Bindings {
            hit_test: HitTestBehavior::Content,
            ..Bindings::DEFAULT
        };
        store.set_bindings(node, custom);
        store.set_cached(node, true);

        let mut backend = StackBackend::new();
        store.render(node, &mut backend);
        let live = store.bindings(node);
        assert_eq!(live.update_transform, TransformBehavior::Local);
        assert_eq!(live.bounds, BoundsBehavior::Proxy);
        assert_eq!(live.hit_test, HitTestBehavior::Proxy);

        store.set_cached(node, false);
        assert_eq!(store.bindings(node), custom);
        assert_eq!(backend.rec.released(), [1]);
        assert!(store.cached_proxy(node).is_none());
    }

    #[test]
    fn re_enabling_recaptures_and_resnapshots() {
        let (mut store, node) = scene();
        let mut backend = ContextBackend::new();
        store.set_cached(node, true);
        store.render(node, &mut backend);
        store.set_cached(node, false);

        let changed = Bindings {
            hit_test: HitTestBehavior::Disabled,
            ..Bindings::DEFAULT
        };
        store.set_bindings(node, changed);
        store.set_cached(node, true);
        assert_eq!(store.cache[node.idx as usize].saved, Some(changed));
        store.render(node, &mut backend);
        assert_eq!(backend.rec.allocations.len(), 2, "fresh snapshot per cycle");
        store.set_cached(node, false);
        assert_eq!(store.bindings(node), changed);
        assert_eq!(backend.rec.released(), [1, 2]);
    }

    #[test]
    fn set_bindings_while_cached_updates_originals() {
        let (mut store, node) = scene();
        store.set_cached(node, true);
        let mut backend = StackBackend::new();
        store.render(node, &mut backend);

        let custom = Bindings {
            hit_test: HitTestBehavior::Disabled,
            ..Bindings::DEFAULT
        };
        store.set_bindings(node, custom);
        assert_eq!(
            store.bindings(node).hit_test,
            HitTestBehavior::Proxy,
            "proxy keeps answering hit tests"
        );
        store.set_cached(node, false);
        assert_eq!(store.bindings(node), custom);
    }

    #[test]
    fn destroy_while_cached_releases_once() {
        let (mut store, node) = scene();
        store.set_cached(node, true);
        let mut backend = StackBackend::new();
        store.render(node, &mut backend);

        assert!(store.destroy(node), "live node is destroyed");
        assert!(!store.destroy(node), "second destroy is ignored");
        assert!(!store.destroy(node), "third destroy is ignored");
        assert_eq!(backend.rec.released(), [1]);
    }

    #[test]
    fn destroy_cached_without_snapshot_releases_nothing() {
        let (mut store, node) = scene();
        store.set_cached(node, true);
        assert!(store.destroy(node), "live node is destroyed");
        assert!(!store.is_alive(node));
    }

    #[test]
    fn destroying_ancestor_releases_cached_descendant() {
        let (mut store, child) = scene();
        let root = store.create_node();
        store.add_child(root, child);
        store.update_transforms();
        store.set_cached(child, true);
        let mut backend = StackBackend::new();
        store.render_roots(&mut backend);
        assert!(store.cached_proxy(child).is_some());

        store.destroy(root);
        assert_eq!(backend.rec.released(), [1]);
        assert!(!store.is_alive(child));
    }

    #[test]
    fn stale_handle_is_ignored() {
        let (mut store, node) = scene();
        store.destroy(node);
        store.set_cache_mode(node, CacheMode::Cached);
        store.set_cached(node, false);
        assert!(!store.destroy(node), "stale destroy returns false");
    }

    #[test]
    fn release_cache_rearms_lazy_snapshot() {
        let (mut store, node) = scene();
        store.set_cached(node, true);
        let mut backend = StackBackend::new();
        store.render(node, &mut backend);
        store.release_cache(node);
        assert!(store.is_cached(node));
        assert!(store.cached_proxy(node).is_none());
        assert_eq!(store.bindings(node).hit_test, HitTestBehavior::Subtree);

        store.release_cache(node);
        assert_eq!(backend.rec.released(), [1], "second release is a no-op");

        store.render(node, &mut backend);
        assert_eq!(backend.rec.allocations.len(), 2);
        assert!(store.contains_point(node, Point::new(4.0, 4.0)));
    }

    #[test]
    fn cached_node_follows_its_parent() {
        let (mut store, node) = scene();
        let root = store.create_node();
        store.add_child(root, node);
        store.update_transforms();
        store.set_cached(node, true);
        let mut backend = StackBackend::new();
        store.render_roots(&mut backend);

        store.set_transform(root, Affine::translate((50.0, 0.0)));
        store.update_transforms();
        let proxy = store.cached_proxy(node).map(CachedProxy::world_transform);
        assert_eq!(proxy, Some(Affine::translate((50.0, 0.0))));
        assert_eq!(store.bounds(node), Rect::new(50.0, 0.0, 58.0, 8.0));
    }
}
