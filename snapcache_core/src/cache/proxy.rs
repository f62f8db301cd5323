// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The textured-quad stand-in for a cached subtree.

use core::cell::Cell;

use kurbo::{Affine, Point, Rect, Vec2};

use crate::backend::{OffscreenSurface, RenderBackend};

/// A cached snapshot of a node's subtree, drawn as one textured quad.
///
/// The quad is the surface's pixel size. Its top-left corner sits at
/// `-anchor * size` in the node's local space, which puts every snapshot
/// pixel back where the subtree drew it.
#[derive(Debug)]
pub struct CachedProxy<S> {
    surface: S,
    anchor: Vec2,
    world_transform: Affine,
    world_alpha: f32,
    bounds: Cell<Option<Rect>>,
}

impl<S: OffscreenSurface> CachedProxy<S> {
    /// Wraps `surface`, captured from local-space `bounds`.
    pub(crate) fn new(surface: S, bounds: Rect, world_transform: Affine) -> Self {
        Self {
            surface,
            anchor: anchor_for(bounds),
            world_transform,
            world_alpha: 1.0,
            bounds: Cell::new(None),
        }
    }

    /// The snapshot surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Normalized origin offset of the quad.
    #[must_use]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    /// World transform of the cached node, as of its last update.
    #[must_use]
    pub fn world_transform(&self) -> Affine {
        self.world_transform
    }

    /// World alpha the proxy draws with.
    #[must_use]
    pub fn world_alpha(&self) -> f32 {
        self.world_alpha
    }

    /// The quad in the node's local space.
    #[must_use]
    pub fn local_rect(&self) -> Rect {
        let w = f64::from(self.surface.width());
        let h = f64::from(self.surface.height());
        let x0 = -self.anchor.x * w;
        let y0 = -self.anchor.y * h;
        Rect::new(x0, y0, x0 + w, y0 + h)
    }

    /// Maps surface pixel space to world space.
    #[must_use]
    pub fn quad_transform(&self) -> Affine {
        self.world_transform * Affine::translate(self.local_rect().origin().to_vec2())
    }

    /// World-space bounding box of the quad, memoized until the next
    /// [`invalidate_bounds`](Self::invalidate_bounds) or transform change.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        if let Some(b) = self.bounds.get() {
            return b;
        }
        let b = self.world_transform.transform_rect_bbox(self.local_rect());
        self.bounds.set(Some(b));
        b
    }

    /// Drops the memoized bounds.
    pub fn invalidate_bounds(&self) {
        self.bounds.set(None);
    }

    /// Whether world-space `point` falls strictly inside the quad.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        let p = self.world_transform.inverse() * point;
        let r = self.local_rect();
        p.x > r.x0 && p.x < r.x1 && p.y > r.y0 && p.y < r.y1
    }

    pub(crate) fn set_world_transform(&mut self, transform: Affine) {
        if self.world_transform != transform {
            self.world_transform = transform;
            self.bounds.set(None);
        }
    }

    pub(crate) fn set_world_alpha(&mut self, alpha: f32) {
        self.world_alpha = alpha;
    }

    /// Draws the quad.
    pub fn draw<B>(&self, backend: &mut B)
    where
        B: RenderBackend<Surface = S>,
    {
        backend.draw_surface(&self.surface, self.quad_transform(), self.world_alpha);
    }

    /// Releases the surface.
    pub fn release(self) {
        self.surface.destroy();
    }
}

/// Normalized offset of the local origin inside `bounds`.
///
/// A zero extent yields `0.0` on that axis.
pub(crate) fn anchor_for(bounds: Rect) -> Vec2 {
    let axis = |origin: f64, extent: f64| {
        if extent == 0.0 { 0.0 } else { -origin / extent }
    };
    Vec2::new(
        axis(bounds.x0, bounds.width()),
        axis(bounds.y0, bounds.height()),
    )
}
