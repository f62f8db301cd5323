// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Local bounds measurement ahead of a snapshot.

use kurbo::{Affine, Rect};

use crate::backend::OffscreenSurface;
use crate::scene::{NodeId, SceneStore};

impl<S: OffscreenSurface> SceneStore<S> {
    /// Measures the bounds of `id`'s subtree in the node's local space,
    /// grown by the padding of the node's first effect.
    ///
    /// The node itself is always measured from its subtree, even once a
    /// proxy stands in for it; cached descendants report their proxies.
    ///
    /// Recomputes the world transforms of every descendant as a side effect,
    /// relative to the node's local space; the node's own world transform is
    /// left as it was.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn estimate_bounds(&mut self, id: NodeId) -> Rect {
        self.validate(id);
        self.estimate_bounds_at(id.idx)
    }

    pub(crate) fn estimate_bounds_at(&mut self, idx: u32) -> Rect {
        let i = idx as usize;
        let world = self.world_transform[i];
        self.world_transform[i] = Affine::IDENTITY;
        self.update_children_at(idx);
        let raw = self.measure_subtree_at(idx).unwrap_or(Rect::ZERO);
        self.world_transform[i] = world;

        match self.effects[i].first() {
            Some(effect) => raw.inflate(effect.padding, effect.padding),
            None => raw,
        }
    }
}

/// Pixel size of a surface covering `bounds`, never below 1x1.
#[expect(
    clippy::cast_possible_truncation,
    reason = "sides are the truncated extent; negative and NaN extents saturate to zero"
)]
pub(crate) fn surface_size(bounds: Rect) -> (u32, u32) {
    let side = |extent: f64| (extent as u32).max(1);
    (side(bounds.width()), side(bounds.height()))
}
