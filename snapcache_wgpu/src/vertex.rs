// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertex layout and CPU-side tessellation into clip space.

use bytemuck::{Pod, Zeroable};
use kurbo::{Affine, PathEl, Point};
use snapcache_core::scene::{Color, Geometry};

/// Flattening tolerance for curved outlines, in local units.
const FLATTEN_TOLERANCE: f64 = 0.25;

/// One textured, tinted vertex. Colors are premultiplied.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub(crate) position: [f32; 2],
    pub(crate) uv: [f32; 2],
    pub(crate) color: [f32; 4],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Maps world pixels on a `width` x `height` target to normalized device
/// coordinates (y up).
#[derive(Clone, Copy, Debug)]
pub(crate) struct ClipSpace {
    width: f64,
    height: f64,
}

impl ClipSpace {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width: f64::from(width.max(1)),
            height: f64::from(height.max(1)),
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "clip coordinates are f32 on the GPU"
    )]
    pub(crate) fn map(self, p: Point) -> [f32; 2] {
        [
            (2.0 * p.x / self.width - 1.0) as f32,
            (1.0 - 2.0 * p.y / self.height) as f32,
        ]
    }
}

/// Premultiplied RGBA for `color` drawn at `alpha`.
pub(crate) fn premultiplied(color: Color, alpha: f32) -> [f32; 4] {
    let [r, g, b, a] = color.to_f32_array();
    let a = a * alpha.clamp(0.0, 1.0);
    [r * a, g * a, b * a, a]
}

/// Appends a triangle fan covering `geometry` under `transform`.
///
/// Both supported outlines are convex, so fanning from the first point is
/// exact. Returns the number of vertices written.
pub(crate) fn fill(
    out: &mut Vec<Vertex>,
    geometry: &Geometry,
    transform: Affine,
    clip: ClipSpace,
    color: [f32; 4],
) -> usize {
    let mut outline = Vec::new();
    kurbo::flatten(geometry.to_path(FLATTEN_TOLERANCE), FLATTEN_TOLERANCE, |el| {
        if let PathEl::MoveTo(p) | PathEl::LineTo(p) = el
            && outline.last() != Some(&p)
        {
            outline.push(p);
        }
    });
    if outline.last() == outline.first() {
        outline.pop();
    }
    if outline.len() < 3 {
        return 0;
    }

    let vertex = |p: Point| Vertex {
        position: clip.map(transform * p),
        uv: [0.0, 0.0],
        color,
    };
    let start = out.len();
    let first = outline[0];
    for pair in outline[1..].windows(2) {
        out.extend([vertex(first), vertex(pair[0]), vertex(pair[1])]);
    }
    out.len() - start
}

/// Appends two triangles mapping a `width` x `height` texture through
/// `transform`, tinted by `alpha`.
pub(crate) fn quad(
    out: &mut Vec<Vertex>,
    width: u32,
    height: u32,
    transform: Affine,
    clip: ClipSpace,
    alpha: f32,
) {
    let (w, h) = (f64::from(width), f64::from(height));
    let a = alpha.clamp(0.0, 1.0);
    let corner = |x: f64, y: f64, u: f32, v: f32| Vertex {
        position: clip.map(transform * Point::new(x, y)),
        uv: [u, v],
        color: [a; 4],
    };
    let tl = corner(0.0, 0.0, 0.0, 0.0);
    let tr = corner(w, 0.0, 1.0, 0.0);
    let br = corner(w, h, 1.0, 1.0);
    let bl = corner(0.0, h, 0.0, 1.0);
    out.extend([tl, bl, br, tl, br, tr]);
}
