// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node bitmap caching.
//!
//! A node is switched into [`CacheMode::Cached`] with
//! [`SceneStore::set_cache_mode`](crate::scene::SceneStore::set_cache_mode).
//! Nothing is allocated at that point; the node's render binding is pointed
//! at the cached path and its destroy binding at a wrapper that leaves cached
//! mode first.
//!
//! The first time the node renders in cached mode:
//!
//! 1. its subtree bounds are measured in local space, grown by the padding of
//!    its first effect;
//! 2. a surface of that pixel size is allocated and the subtree is rendered
//!    into it under a translation that puts the bounds' top-left at the
//!    surface origin, with the backend's state saved around the render;
//! 3. a [`CachedProxy`] takes ownership of the surface, and the node's
//!    transform, bounds and hit-test bindings are redirected to it.
//!
//! Every later frame draws the proxy as one textured quad. Leaving cached
//! mode (or destroying the node) releases the surface and reinstates the
//! original bindings.

mod bounds;
mod controller;
mod proxy;
mod snapshot;

pub use proxy::CachedProxy;

use crate::scene::Bindings;

/// Whether a node renders its subtree or a cached snapshot of it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CacheMode {
    /// Render the subtree every frame.
    #[default]
    Normal,
    /// Render a snapshot of the subtree.
    Cached,
}

impl CacheMode {
    /// Returns `Cached` for `true` and `Normal` for `false`.
    #[must_use]
    pub const fn from_enabled(enabled: bool) -> Self {
        if enabled { Self::Cached } else { Self::Normal }
    }
}

/// Per-node cache state.
#[derive(Debug)]
pub(crate) struct CacheSlot<S> {
    pub(crate) mode: CacheMode,
    /// Bindings in effect before caching; `Some` exactly while cached.
    pub(crate) saved: Option<Bindings>,
    /// `Some` once the first cached render has taken a snapshot.
    pub(crate) proxy: Option<CachedProxy<S>>,
}

impl<S> Default for CacheSlot<S> {
    fn default() -> Self {
        Self {
            mode: CacheMode::Normal,
            saved: None,
            proxy: None,
        }
    }
}
