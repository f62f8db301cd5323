// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the cache lifecycle.
//!
//! This module provides a [`TraceSink`] trait with one method per cache
//! lifecycle event. All method bodies default to no-ops, so implementing only
//! the events you care about is fine.
//!
//! [`Tracer`] wraps an optional boxed sink and is owned by the
//! [`SceneStore`](crate::scene::SceneStore). When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing and installed sinks are
//! dropped. When **on**, each method performs a single `Option` branch before
//! dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use alloc::boxed::Box;

use kurbo::{Rect, Vec2};

use crate::backend::SurfaceError;
use crate::cache::CacheMode;
use crate::scene::NodeId;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a node's cache mode actually changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheModeEvent {
    /// The node whose mode changed.
    pub node: NodeId,
    /// The mode it is now in.
    pub mode: CacheMode,
}

/// Emitted after a subtree has been captured into a new surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapshotEvent {
    /// The cached node.
    pub node: NodeId,
    /// Captured local bounds, padding included.
    pub bounds: Rect,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Normalized anchor of the proxy quad.
    pub anchor: Vec2,
}

/// Why lazy cache initialization gave up for this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotFailure {
    /// The backend refused to allocate the surface.
    Allocation(SurfaceError),
    /// The bound surface was missing when the snapshot finished.
    TargetLost,
}

/// Emitted when a snapshot could not be taken. The node renders uncached for
/// the frame and retries on the next one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapshotFailedEvent {
    /// The cached node.
    pub node: NodeId,
    /// Requested surface width.
    pub width: u32,
    /// Requested surface height.
    pub height: u32,
    /// What went wrong.
    pub reason: SnapshotFailure,
}

/// Emitted when a proxy's surface is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceReleasedEvent {
    /// The node that owned the proxy.
    pub node: NodeId,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
}

/// Emitted each time a cached proxy is drawn in place of its subtree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CachedDrawEvent {
    /// The cached node.
    pub node: NodeId,
    /// World alpha the proxy was drawn with.
    pub alpha: f32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives cache lifecycle events.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a node switches between normal and cached mode.
    fn on_cache_mode(&mut self, e: &CacheModeEvent) {
        _ = e;
    }

    /// Called after a subtree snapshot completes.
    fn on_snapshot(&mut self, e: &SnapshotEvent) {
        _ = e;
    }

    /// Called when a snapshot attempt is abandoned.
    fn on_snapshot_failed(&mut self, e: &SnapshotFailedEvent) {
        _ = e;
    }

    /// Called when a proxy surface is released.
    fn on_surface_released(&mut self, e: &SurfaceReleasedEvent) {
        _ = e;
    }

    /// Called when a proxy is drawn.
    fn on_cached_draw(&mut self, e: &CachedDrawEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional boxed [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            drop(sink);
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Removes and returns the installed sink, if any.
    #[inline]
    pub fn take_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        #[cfg(feature = "trace")]
        {
            self.sink.take()
        }
        #[cfg(not(feature = "trace"))]
        {
            None
        }
    }

    /// Emits a [`CacheModeEvent`].
    #[inline]
    pub fn cache_mode(&mut self, e: &CacheModeEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cache_mode(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SnapshotEvent`].
    #[inline]
    pub fn snapshot(&mut self, e: &SnapshotEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_snapshot(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SnapshotFailedEvent`].
    #[inline]
    pub fn snapshot_failed(&mut self, e: &SnapshotFailedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_snapshot_failed(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SurfaceReleasedEvent`].
    #[inline]
    pub fn surface_released(&mut self, e: &SurfaceReleasedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_surface_released(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CachedDrawEvent`].
    #[inline]
    pub fn cached_draw(&mut self, e: &CachedDrawEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cached_draw(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}
