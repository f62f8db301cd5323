// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy snapshot capture and the per-frame cached render path.

use kurbo::{Affine, Rect};

use super::CachedProxy;
use super::bounds::surface_size;
use crate::backend::{OffscreenSurface, RenderBackend};
use crate::scene::{BoundsBehavior, HitTestBehavior, RenderBehavior, SceneStore, TransformBehavior};
use crate::state::RenderScope;
use crate::trace::{CachedDrawEvent, SnapshotEvent, SnapshotFailedEvent, SnapshotFailure};

impl<S: OffscreenSurface> SceneStore<S> {
    /// Cached render entry point.
    ///
    /// Skips entirely when the node would not draw. Otherwise takes the
    /// snapshot on first use and draws the proxy. If no snapshot could be
    /// taken, the subtree renders normally this frame.
    pub(crate) fn render_cached_at<B>(&mut self, idx: u32, backend: &mut B)
    where
        B: RenderBackend<Surface = S>,
    {
        if !self.is_drawable(idx) {
            return;
        }
        let i = idx as usize;
        if self.cache[i].proxy.is_none() {
            self.init_proxy_at(idx, backend);
        }

        let node = self.handle(idx);
        let world = self.world_transform[i];
        let alpha = self.world_alpha[i];
        if let Some(proxy) = self.cache[i].proxy.as_mut() {
            proxy.set_world_transform(world);
            proxy.set_world_alpha(alpha);
            proxy.draw(backend);
            self.tracer.cached_draw(&CachedDrawEvent { node, alpha });
        } else {
            self.render_subtree_at(idx, backend);
        }
    }

    /// Measures, allocates, captures, and installs the proxy.
    ///
    /// On failure the node keeps its lazy bindings and the attempt is
    /// repeated on the next cached render.
    fn init_proxy_at<B>(&mut self, idx: u32, backend: &mut B)
    where
        B: RenderBackend<Surface = S>,
    {
        let i = idx as usize;
        let node = self.handle(idx);

        // Nothing queued for the current target may land in the snapshot.
        backend.flush();
        let bounds = self.estimate_bounds_at(idx);
        let (width, height) = surface_size(bounds);

        let captured = match backend.allocate_surface(width, height) {
            Ok(surface) => self
                .snapshot_at(idx, bounds, surface, backend)
                .ok_or(SnapshotFailure::TargetLost),
            Err(err) => Err(SnapshotFailure::Allocation(err)),
        };
        // Descendants were last updated relative to the node or the surface.
        self.update_children_at(idx);

        let surface = match captured {
            Ok(surface) => surface,
            Err(reason) => {
                self.tracer.snapshot_failed(&SnapshotFailedEvent {
                    node,
                    width,
                    height,
                    reason,
                });
                return;
            }
        };

        let proxy = CachedProxy::new(surface, bounds, self.world_transform[i]);
        let anchor = proxy.anchor();
        self.cache[i].proxy = Some(proxy);

        let live = &mut self.bindings[i];
        live.update_transform = TransformBehavior::Local;
        live.bounds = BoundsBehavior::Proxy;
        live.hit_test = HitTestBehavior::Proxy;
        self.update_transform_at(idx);

        self.tracer.snapshot(&SnapshotEvent {
            node,
            bounds,
            width,
            height,
            anchor,
        });
    }

    /// Renders the node's real subtree into `surface` and hands the surface
    /// back, or `None` if the backend lost it.
    ///
    /// The backend's state is saved before `surface` is bound and restored
    /// before this returns.
    fn snapshot_at<B>(&mut self, idx: u32, bounds: Rect, surface: S, backend: &mut B) -> Option<S>
    where
        B: RenderBackend<Surface = S>,
    {
        let i = idx as usize;
        let original = match self.cache[i].saved.map_or(RenderBehavior::Subtree, |b| b.render) {
            RenderBehavior::Cached => RenderBehavior::Subtree,
            render => render,
        };
        let world = self.world_transform[i];
        let alpha = self.world_alpha[i];

        let mut scope = RenderScope::enter(backend);
        scope.bind_target(surface, true);

        self.bindings[i].render = original;
        self.world_transform[i] = Affine::translate((-bounds.x0, -bounds.y0));
        self.world_alpha[i] = 1.0;
        self.update_children_at(idx);
        self.render_at(idx, &mut *scope);
        self.bindings[i].render = RenderBehavior::Cached;
        self.world_transform[i] = world;
        self.world_alpha[i] = alpha;

        let surface = scope.take_target();
        drop(scope);
        surface
    }
}
