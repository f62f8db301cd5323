// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for render integrations.
//!
//! Snapcache splits drawing into *backend* crates. Each backend provides:
//!
//! - **Surfaces**: An [`OffscreenSurface`] type that can be rendered into
//!   and later sampled as a texture (a GPU texture with a render-target
//!   view, or a raster pixmap). Surfaces are owned values; releasing one
//!   consumes it.
//!
//! - **Render state**: Whatever the backend considers its current target,
//!   exposed through [`save_state`](RenderBackend::save_state) and
//!   [`restore_state`](RenderBackend::restore_state). GPU backends keep a
//!   stack of targets plus a filter stack
//!   ([`TargetStack`](crate::state::TargetStack)); raster backends keep one
//!   current drawing context ([`CurrentContext`](crate::state::CurrentContext)).
//!
//! - **Drawing**: Solid fills for node content and textured quads for cached
//!   proxies.
//!
//! # Snapshot protocol
//!
//! The snapshotter drives a backend like this:
//!
//! ```rust,ignore
//! backend.flush();
//! let surface = backend.allocate_surface(w, h)?;
//! let mut scope = RenderScope::enter(backend); // save_state
//! scope.bind_target(surface, true);
//! /* render the subtree through `&mut *scope` */
//! let surface = scope.take_target();
//! drop(scope);                                 // restore_state, release leftovers
//! ```

use core::fmt;

use kurbo::Affine;

use crate::effect::Effect;
use crate::scene::{Color, Geometry};

/// A backend-owned drawable region of fixed pixel size.
pub trait OffscreenSurface {
    /// Width in pixels (at least 1).
    fn width(&self) -> u32;

    /// Height in pixels (at least 1).
    fn height(&self) -> u32;

    /// Releases the surface's backing resources.
    fn destroy(self)
    where
        Self: Sized;
}

/// Why a surface could not be allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceError {
    /// The requested size exceeds what the backend can allocate.
    TooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Largest side the backend accepts.
        max: u32,
    },
    /// The backend failed for another reason.
    Backend,
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge { width, height, max } => {
                write!(f, "surface {width}x{height} exceeds maximum side {max}")
            }
            Self::Backend => f.write_str("backend failed to allocate surface"),
        }
    }
}

impl core::error::Error for SurfaceError {}

/// A renderer that scene nodes draw through.
///
/// Implemented by the raster and GPU backends, and by test doubles.
pub trait RenderBackend {
    /// The offscreen surface type this backend allocates.
    type Surface: OffscreenSurface;

    /// Everything [`restore_state`](Self::restore_state) needs to put the
    /// renderer back exactly as [`save_state`](Self::save_state) found it.
    type SavedState;

    /// Submits any batched draws to the current target.
    fn flush(&mut self);

    /// Allocates a transparent surface of the given pixel size.
    fn allocate_surface(&mut self, width: u32, height: u32)
    -> Result<Self::Surface, SurfaceError>;

    /// Captures the current target (and, for GPU backends, the target and
    /// filter stacks), leaving the renderer ready to render into a new
    /// target from scratch.
    fn save_state(&mut self) -> Self::SavedState;

    /// Reinstates a state captured by [`save_state`](Self::save_state).
    ///
    /// A surface still bound at this point (one that
    /// [`take_target`](Self::take_target) did not hand back) is returned so
    /// the caller can release it.
    fn restore_state(&mut self, state: Self::SavedState) -> Option<Self::Surface>;

    /// Makes `surface` the current target, clearing it first when `clear` is
    /// set.
    fn bind_target(&mut self, surface: Self::Surface, clear: bool);

    /// Flushes pending draws and hands back the surface bound by
    /// [`bind_target`](Self::bind_target).
    ///
    /// Returns `None` if the current target is not a bound surface.
    fn take_target(&mut self) -> Option<Self::Surface>;

    /// Enters an effect pass for the draws that follow.
    fn push_filter(&mut self, effect: &Effect) {
        _ = effect;
    }

    /// Leaves the innermost effect pass.
    fn pop_filter(&mut self) {}

    /// Fills `geometry` (in local space) under `transform` with `color`,
    /// multiplied by `alpha`.
    fn fill(&mut self, geometry: &Geometry, transform: Affine, color: Color, alpha: f32);

    /// Draws `surface` as a textured quad. `transform` maps the unit of one
    /// surface pixel to the current target.
    fn draw_surface(&mut self, surface: &Self::Surface, transform: Affine, alpha: f32);
}
