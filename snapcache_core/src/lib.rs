// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node bitmap caching for retained-mode 2D scene graphs.
//!
//! `snapcache_core` lets any node of a scene graph be *flattened* into a
//! single pre-rendered surface. While a node is cached, each frame draws one
//! textured quad in place of re-walking and re-rendering its subtree. It is
//! `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! The layer sits between a host scene store and a render backend:
//!
//! ```text
//!   set_cache_mode(Cached) ─► Bindings swapped (render, destroy)
//!                                   │
//!   first cached render ────────────┘
//!       │
//!       ▼
//!   estimate bounds ──► allocate surface ──► snapshot subtree ──► CachedProxy
//!                                                                   │
//!   every later frame ◄─────────────────────────────────────────────┘
//!       draw_surface(proxy)
//! ```
//!
//! **[`scene`]**: Struct-of-arrays node store with generational handles.
//! Each node carries a [`Bindings`](scene::Bindings) record that selects how
//! it renders, updates transforms, reports bounds, hit-tests and is
//! destroyed.
//!
//! **[`cache`]**: The cache mode controller, bounds estimator, subtree
//! snapshotter and [`CachedProxy`](cache::CachedProxy).
//!
//! **[`backend`]**: The [`RenderBackend`](backend::RenderBackend) and
//! [`OffscreenSurface`](backend::OffscreenSurface) traits that raster and GPU
//! backends implement.
//!
//! **[`state`]**: Save/restore disciplines for renderer-global state: a
//! GPU-style [`TargetStack`](state::TargetStack), a raster-style
//! [`CurrentContext`](state::CurrentContext), and the
//! [`RenderScope`](state::RenderScope) guard that restores either one.
//!
//! **[`effect`]**: Post-processing effects attached to nodes.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! cache-lifecycle instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod cache;
pub mod effect;
pub mod scene;
pub mod state;
pub mod trace;

#[cfg(test)]
pub(crate) mod testing;
