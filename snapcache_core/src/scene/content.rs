// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable node content.

use kurbo::{Point, Rect, Vec2};

/// A straight-alpha RGBA color with 8 bits per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba8(0, 0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba8(255, 255, 255, 255);

    /// Creates a color from its four channels.
    #[inline]
    #[must_use]
    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[inline]
    #[must_use]
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::rgba8(r, g, b, 255)
    }

    /// Returns the channels normalized to `0.0..=1.0`.
    #[must_use]
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

/// The shape of a node's own content, in the node's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// An axis-aligned ellipse given by its center and half extents.
    Ellipse {
        /// Center of the ellipse.
        center: Point,
        /// Half width and half height.
        radii: Vec2,
    },
}

impl Geometry {
    /// Returns the tight axis-aligned bounding box in local space.
    #[must_use]
    pub fn bounding_box(&self) -> Rect {
        match *self {
            Self::Rect(rect) => rect.abs(),
            Self::Ellipse { center, radii } => Rect::new(
                center.x - radii.x,
                center.y - radii.y,
                center.x + radii.x,
                center.y + radii.y,
            ),
        }
    }

    /// Returns whether `p` (in local space) lies inside the shape.
    ///
    /// Rectangles include their left and top edges and exclude the right and
    /// bottom ones. An ellipse with a non-positive radius contains nothing;
    /// otherwise its boundary is inside.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        match *self {
            Self::Rect(rect) => rect.abs().contains(p),
            Self::Ellipse { center, radii } => {
                if radii.x <= 0.0 || radii.y <= 0.0 {
                    return false;
                }
                let nx = (p.x - center.x) / radii.x;
                let ny = (p.y - center.y) / radii.y;
                nx * nx + ny * ny <= 1.0
            }
        }
    }

    /// Returns the equivalent `kurbo` shape as a path, for backends that
    /// rasterize arbitrary outlines.
    #[must_use]
    pub fn to_path(&self, tolerance: f64) -> kurbo::BezPath {
        use kurbo::Shape as _;
        match *self {
            Self::Rect(rect) => rect.abs().to_path(tolerance),
            Self::Ellipse { center, radii } => {
                kurbo::Ellipse::new(center, radii, 0.0).to_path(tolerance)
            }
        }
    }
}

/// What a node draws itself, before its children.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Content {
    /// Outline in local space.
    pub geometry: Geometry,
    /// Fill color.
    pub color: Color,
}

impl Content {
    /// Creates content that fills `geometry` with `color`.
    #[must_use]
    pub const fn fill(geometry: Geometry, color: Color) -> Self {
        Self { geometry, color }
    }
}
