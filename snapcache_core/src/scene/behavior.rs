// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Swappable per-node behaviors.
//!
//! Every node dispatches five operations through a [`Bindings`] record
//! instead of fixed methods. Caching a node is a matter of swapping some of
//! those strategies for cached ones and putting the saved originals back
//! afterwards; see [`cache`](crate::cache).

/// How a node draws itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderBehavior {
    /// Draw own content, then each child through its own binding.
    #[default]
    Subtree,
    /// Draw the node's cached proxy, creating it on first use.
    Cached,
}

/// How a node recomputes its world transform and world alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransformBehavior {
    /// Update this node, then each child through its own binding.
    #[default]
    Subtree,
    /// Update this node only (and its cached proxy, if any).
    Local,
}

/// How a node reports its world-space bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BoundsBehavior {
    /// Union of own content and visible descendants' bounds.
    #[default]
    Subtree,
    /// Bounds of the cached proxy's quad.
    Proxy,
}

/// How a node answers a world-space hit test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HitTestBehavior {
    /// Hit if own content or any descendant hits.
    #[default]
    Subtree,
    /// Hit only on the node's own content shape.
    Content,
    /// Never hit.
    Disabled,
    /// Hit anywhere on the cached proxy's quad.
    Proxy,
}

/// What happens when a node is destroyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DestroyBehavior {
    /// Free the node's slot.
    #[default]
    Release,
    /// Leave cached mode (releasing the surface), then run the saved
    /// original destroy behavior.
    Uncache,
}

/// The full dispatch table for one node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bindings {
    /// Render entry point.
    pub render: RenderBehavior,
    /// Transform update entry point.
    pub update_transform: TransformBehavior,
    /// Bounds query.
    pub bounds: BoundsBehavior,
    /// Hit test.
    pub hit_test: HitTestBehavior,
    /// Destruction.
    pub destroy: DestroyBehavior,
}

impl Bindings {
    /// The bindings of a freshly created node.
    pub const DEFAULT: Self = Self {
        render: RenderBehavior::Subtree,
        update_transform: TransformBehavior::Subtree,
        bounds: BoundsBehavior::Subtree,
        hit_test: HitTestBehavior::Subtree,
        destroy: DestroyBehavior::Release,
    };
}
