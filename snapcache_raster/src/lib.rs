// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! tiny-skia raster backend for snapcache.
//!
//! [`RasterBackend`] draws into a main [`Pixmap`] and allocates
//! [`RasterSurface`]s (also pixmaps) for cached subtrees. Raster drawing is
//! immediate, so [`flush`](RenderBackend::flush) does nothing, and the
//! render state is a single current drawing context: either the main pixmap
//! or the surface a snapshot is being drawn into.
//!
//! Effects are not rasterized; their padding still grows snapshot bounds.
//!
//! ```rust
//! use kurbo::{Affine, Rect};
//! use snapcache_core::scene::{Color, Content, Geometry, SceneStore};
//! use snapcache_raster::{RasterBackend, RasterBackendOptions};
//!
//! let mut backend = RasterBackend::new(64, 64, RasterBackendOptions::default()).unwrap();
//! let mut store = SceneStore::new();
//! let node = store.create_node();
//! store.set_transform(node, Affine::translate((8.0, 8.0)));
//! store.set_content(
//!     node,
//!     Some(Content::fill(Geometry::Rect(Rect::new(0.0, 0.0, 16.0, 16.0)), Color::WHITE)),
//! );
//! store.set_cached(node, true);
//!
//! store.update_transforms();
//! backend.begin_frame();
//! store.render_roots(&mut backend);
//! assert_eq!(backend.pixmap().pixel(12, 12).unwrap().alpha(), 255);
//! ```

use kurbo::{Affine, PathEl};
use snapcache_core::backend::{OffscreenSurface, RenderBackend, SurfaceError};
use snapcache_core::scene::{Color, Geometry};
use snapcache_core::state::CurrentContext;
use tiny_skia::{
    FillRule, FilterQuality, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Transform,
};

/// Flattening tolerance for curved outlines, in local units.
const PATH_TOLERANCE: f64 = 0.1;

/// Raster backend configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterBackendOptions {
    /// Largest side, in pixels, of any pixmap the backend creates.
    pub max_surface_size: u32,
    /// Color the main pixmap is cleared to by
    /// [`begin_frame`](RasterBackend::begin_frame).
    pub clear_color: Color,
}

impl Default for RasterBackendOptions {
    fn default() -> Self {
        Self {
            max_surface_size: 8192,
            clear_color: Color::TRANSPARENT,
        }
    }
}

/// An offscreen pixmap holding a cached snapshot.
#[derive(Debug)]
pub struct RasterSurface {
    pixmap: Pixmap,
}

impl RasterSurface {
    /// The snapshot pixels.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

impl OffscreenSurface for RasterSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn destroy(self) {
        drop(self.pixmap);
    }
}

/// The current drawing context.
#[derive(Debug)]
pub enum RasterTarget {
    /// The backend's main pixmap.
    Main,
    /// A snapshot surface being drawn into.
    Offscreen(RasterSurface),
}

/// A [`RenderBackend`] that rasterizes with tiny-skia.
#[derive(Debug)]
pub struct RasterBackend {
    main: Pixmap,
    ctx: CurrentContext<RasterTarget>,
    options: RasterBackendOptions,
}

impl RasterBackend {
    /// Creates a backend with a `width` x `height` main pixmap.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::TooLarge`] if either side is zero or exceeds
    /// `options.max_surface_size`.
    pub fn new(
        width: u32,
        height: u32,
        options: RasterBackendOptions,
    ) -> Result<Self, SurfaceError> {
        let mut main = new_pixmap(width, height, options.max_surface_size)?;
        main.fill(to_skia(options.clear_color, 1.0));
        Ok(Self {
            main,
            ctx: CurrentContext::new(RasterTarget::Main),
            options,
        })
    }

    /// Clears the main pixmap to the configured clear color.
    pub fn begin_frame(&mut self) {
        self.main.fill(to_skia(self.options.clear_color, 1.0));
    }

    /// The main pixmap.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.main
    }

    /// Consumes the backend and returns the main pixmap.
    #[must_use]
    pub fn into_pixmap(self) -> Pixmap {
        self.main
    }

    /// The backend's configuration.
    #[must_use]
    pub fn options(&self) -> &RasterBackendOptions {
        &self.options
    }

    fn target(&mut self) -> Option<&mut Pixmap> {
        match self.ctx.current_mut()? {
            RasterTarget::Main => Some(&mut self.main),
            RasterTarget::Offscreen(surface) => Some(&mut surface.pixmap),
        }
    }
}

impl RenderBackend for RasterBackend {
    type Surface = RasterSurface;
    type SavedState = Option<RasterTarget>;

    fn flush(&mut self) {}

    fn allocate_surface(&mut self, width: u32, height: u32) -> Result<RasterSurface, SurfaceError> {
        let pixmap = new_pixmap(width, height, self.options.max_surface_size)?;
        Ok(RasterSurface { pixmap })
    }

    fn save_state(&mut self) -> Self::SavedState {
        self.ctx.save()
    }

    fn restore_state(&mut self, state: Self::SavedState) -> Option<RasterSurface> {
        let orphan = match self.ctx.take() {
            Some(RasterTarget::Offscreen(surface)) => Some(surface),
            _ => None,
        };
        self.ctx.restore(state);
        orphan
    }

    fn bind_target(&mut self, mut surface: RasterSurface, clear: bool) {
        if clear {
            surface.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        }
        self.ctx.replace(RasterTarget::Offscreen(surface));
    }

    fn take_target(&mut self) -> Option<RasterSurface> {
        match self.ctx.take() {
            Some(RasterTarget::Offscreen(surface)) => Some(surface),
            other => {
                self.ctx.restore(other);
                None
            }
        }
    }

    fn fill(&mut self, geometry: &Geometry, transform: Affine, color: Color, alpha: f32) {
        let Some(path) = to_skia_path(geometry) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(to_skia(color, alpha));
        paint.anti_alias = true;
        let transform = to_skia_transform(transform);
        if let Some(target) = self.target() {
            target.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
    }

    fn draw_surface(&mut self, surface: &RasterSurface, transform: Affine, alpha: f32) {
        let paint = PixmapPaint {
            opacity: alpha,
            quality: quality_for(transform),
            ..PixmapPaint::default()
        };
        let transform = to_skia_transform(transform);
        if let Some(target) = self.target() {
            target.draw_pixmap(0, 0, surface.pixmap.as_ref(), &paint, transform, None);
        }
    }
}

fn new_pixmap(width: u32, height: u32, max: u32) -> Result<Pixmap, SurfaceError> {
    let too_large = SurfaceError::TooLarge { width, height, max };
    if width > max || height > max {
        return Err(too_large);
    }
    Pixmap::new(width, height).ok_or(too_large)
}

fn to_skia(color: Color, alpha: f32) -> tiny_skia::Color {
    let mut c = tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a);
    c.apply_opacity(alpha);
    c
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia works in f32 device space"
)]
fn to_skia_transform(transform: Affine) -> Transform {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

/// Pixel-aligned copies sample exactly; anything else is filtered.
fn quality_for(transform: Affine) -> FilterQuality {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    let unscaled = a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0;
    if unscaled && e.fract() == 0.0 && f.fract() == 0.0 {
        FilterQuality::Nearest
    } else {
        FilterQuality::Bilinear
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "tiny-skia paths are f32"
)]
fn to_skia_path(geometry: &Geometry) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in geometry.to_path(PATH_TOLERANCE) {
        match el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p) => {
                pb.quad_to(p1.x as f32, p1.y as f32, p.x as f32, p.y as f32);
            }
            PathEl::CurveTo(p1, p2, p) => pb.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}
