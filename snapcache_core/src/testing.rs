// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording backends for unit tests.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::{Affine, Rect};

use crate::backend::{OffscreenSurface, RenderBackend, SurfaceError};
use crate::effect::Effect;
use crate::scene::{Color, Geometry};
use crate::state::{CurrentContext, SavedStack, TargetStack};

/// A surface that logs its own release.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct TestSurface {
    pub(crate) id: u32,
    width: u32,
    height: u32,
    releases: Rc<RefCell<Vec<u32>>>,
}

impl TestSurface {
    pub(crate) fn new(id: u32, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            releases: Rc::default(),
        }
    }

    /// Ids logged by this surface's `destroy`.
    pub(crate) fn releases(&self) -> Rc<RefCell<Vec<u32>>> {
        Rc::clone(&self.releases)
    }
}

impl OffscreenSurface for TestSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn destroy(self) {
        self.releases.borrow_mut().push(self.id);
    }
}

/// Where a recorded draw landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Target {
    Main,
    Surface(u32),
    Nothing,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TestTarget {
    Main,
    Surface(TestSurface),
}

impl TestTarget {
    fn tag(target: Option<&Self>) -> Target {
        match target {
            Some(Self::Main) => Target::Main,
            Some(Self::Surface(s)) => Target::Surface(s.id),
            None => Target::Nothing,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Op {
    /// World-space bounding box of the fill.
    Fill { bbox: Rect, color: Color, alpha: f32 },
    /// World-space bounding box of the quad.
    Quad { surface: u32, bbox: Rect, alpha: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Draw {
    pub(crate) target: Target,
    pub(crate) op: Op,
    /// Filters active when the draw was issued.
    pub(crate) filters: usize,
}

/// Shared bookkeeping for both test backends.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub(crate) draws: Vec<Draw>,
    pub(crate) allocations: Vec<(u32, u32)>,
    pub(crate) clears: Vec<u32>,
    pub(crate) flushes: u32,
    pub(crate) releases: Rc<RefCell<Vec<u32>>>,
    /// Largest side `allocate_surface` accepts.
    pub(crate) max_side: u32,
    /// Makes `take_target` report a lost surface.
    pub(crate) lose_target: bool,
}

impl Recorder {
    fn new() -> Self {
        Self {
            max_side: 4096,
            ..Self::default()
        }
    }

    fn allocate(&mut self, width: u32, height: u32) -> Result<TestSurface, SurfaceError> {
        if width > self.max_side || height > self.max_side {
            return Err(SurfaceError::TooLarge {
                width,
                height,
                max: self.max_side,
            });
        }
        self.allocations.push((width, height));
        let id = u32::try_from(self.allocations.len()).unwrap_or(u32::MAX);
        Ok(TestSurface {
            id,
            width,
            height,
            releases: Rc::clone(&self.releases),
        })
    }

    pub(crate) fn released(&self) -> Vec<u32> {
        self.releases.borrow().clone()
    }

    /// Draws that landed on `target`.
    pub(crate) fn draws_on(&self, target: Target) -> Vec<Draw> {
        self.draws
            .iter()
            .copied()
            .filter(|d| d.target == target)
            .collect()
    }
}

/// GPU-style backend: render-target stack plus filter stack.
#[derive(Debug)]
pub(crate) struct StackBackend {
    pub(crate) stack: TargetStack<TestTarget>,
    pub(crate) rec: Recorder,
}

impl StackBackend {
    pub(crate) fn new() -> Self {
        let mut stack = TargetStack::new();
        stack.push_target(TestTarget::Main);
        Self {
            stack,
            rec: Recorder::new(),
        }
    }

    fn record(&mut self, op: Op) {
        let draw = Draw {
            target: TestTarget::tag(self.stack.top()),
            op,
            filters: self.stack.filters().len(),
        };
        self.rec.draws.push(draw);
    }
}

impl RenderBackend for StackBackend {
    type Surface = TestSurface;
    type SavedState = SavedStack<TestTarget>;

    fn flush(&mut self) {
        self.rec.flushes += 1;
    }

    fn allocate_surface(&mut self, width: u32, height: u32) -> Result<TestSurface, SurfaceError> {
        self.rec.allocate(width, height)
    }

    fn save_state(&mut self) -> Self::SavedState {
        self.stack.save()
    }

    fn restore_state(&mut self, state: Self::SavedState) -> Option<TestSurface> {
        let mut orphan = None;
        while let Some(target) = self.stack.pop_target() {
            if let TestTarget::Surface(s) = target {
                orphan = Some(s);
            }
        }
        self.stack.restore(state);
        orphan
    }

    fn bind_target(&mut self, surface: TestSurface, clear: bool) {
        if clear {
            self.rec.clears.push(surface.id);
        }
        self.stack.push_target(TestTarget::Surface(surface));
    }

    fn take_target(&mut self) -> Option<TestSurface> {
        self.flush();
        if self.rec.lose_target {
            return None;
        }
        match self.stack.pop_target() {
            Some(TestTarget::Surface(s)) => Some(s),
            Some(other) => {
                self.stack.push_target(other);
                None
            }
            None => None,
        }
    }

    fn push_filter(&mut self, effect: &Effect) {
        self.stack.push_filter(*effect);
    }

    fn pop_filter(&mut self) {
        self.stack.pop_filter();
    }

    fn fill(&mut self, geometry: &Geometry, transform: Affine, color: Color, alpha: f32) {
        let bbox = transform.transform_rect_bbox(geometry.bounding_box());
        self.record(Op::Fill { bbox, color, alpha });
    }

    fn draw_surface(&mut self, surface: &TestSurface, transform: Affine, alpha: f32) {
        let quad = Rect::new(
            0.0,
            0.0,
            f64::from(surface.width()),
            f64::from(surface.height()),
        );
        let bbox = transform.transform_rect_bbox(quad);
        self.record(Op::Quad {
            surface: surface.id,
            bbox,
            alpha,
        });
    }
}

/// Raster-style backend: one current drawing context, no filter stack.
#[derive(Debug)]
pub(crate) struct ContextBackend {
    pub(crate) ctx: CurrentContext<TestTarget>,
    pub(crate) rec: Recorder,
}

impl ContextBackend {
    pub(crate) fn new() -> Self {
        Self {
            ctx: CurrentContext::new(TestTarget::Main),
            rec: Recorder::new(),
        }
    }

    fn record(&mut self, op: Op) {
        let draw = Draw {
            target: TestTarget::tag(self.ctx.current()),
            op,
            filters: 0,
        };
        self.rec.draws.push(draw);
    }
}

impl RenderBackend for ContextBackend {
    type Surface = TestSurface;
    type SavedState = Option<TestTarget>;

    fn flush(&mut self) {
        self.rec.flushes += 1;
    }

    fn allocate_surface(&mut self, width: u32, height: u32) -> Result<TestSurface, SurfaceError> {
        self.rec.allocate(width, height)
    }

    fn save_state(&mut self) -> Self::SavedState {
        self.ctx.save()
    }

    fn restore_state(&mut self, state: Self::SavedState) -> Option<TestSurface> {
        let orphan = match self.ctx.take() {
            Some(TestTarget::Surface(s)) => Some(s),
            _ => None,
        };
        self.ctx.restore(state);
        orphan
    }

    fn bind_target(&mut self, surface: TestSurface, clear: bool) {
        if clear {
            self.rec.clears.push(surface.id);
        }
        self.ctx.replace(TestTarget::Surface(surface));
    }

    fn take_target(&mut self) -> Option<TestSurface> {
        if self.rec.lose_target {
            return None;
        }
        match self.ctx.take() {
            Some(TestTarget::Surface(s)) => Some(s),
            other => {
                self.ctx.restore(other);
                None
            }
        }
    }

    fn fill(&mut self, geometry: &Geometry, transform: Affine, color: Color, alpha: f32) {
        let bbox = transform.transform_rect_bbox(geometry.bounding_box());
        self.record(Op::Fill { bbox, color, alpha });
    }

    fn draw_surface(&mut self, surface: &TestSurface, transform: Affine, alpha: f32) {
        let quad = Rect::new(
            0.0,
            0.0,
            f64::from(surface.width()),
            f64::from(surface.height()),
        );
        let bbox = transform.transform_rect_bbox(quad);
        self.record(Op::Quad {
            surface: surface.id,
            bbox,
            alpha,
        });
    }
}
