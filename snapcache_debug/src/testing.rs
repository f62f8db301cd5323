// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A drawing-free backend for driving the store in sink tests.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use kurbo::{Affine, Rect};
use snapcache_core::backend::{OffscreenSurface, RenderBackend, SurfaceError};
use snapcache_core::scene::{Color, Content, Geometry, NodeId, SceneStore};
use snapcache_core::trace::TraceSink;

#[derive(Debug)]
pub(crate) struct NullSurface(u32, u32);

impl OffscreenSurface for NullSurface {
    fn width(&self) -> u32 {
        self.0
    }

    fn height(&self) -> u32 {
        self.1
    }

    fn destroy(self) {}
}

#[derive(Debug, Default)]
struct NullBackend {
    bound: Option<NullSurface>,
}

impl RenderBackend for NullBackend {
    type Surface = NullSurface;
    type SavedState = Option<NullSurface>;

    fn flush(&mut self) {}

    fn allocate_surface(&mut self, width: u32, height: u32) -> Result<NullSurface, SurfaceError> {
        Ok(NullSurface(width, height))
    }

    fn save_state(&mut self) -> Self::SavedState {
        self.bound.take()
    }

    fn restore_state(&mut self, state: Self::SavedState) -> Option<NullSurface> {
        core::mem::replace(&mut self.bound, state)
    }

    fn bind_target(&mut self, surface: NullSurface, _clear: bool) {
        self.bound = Some(surface);
    }

    fn take_target(&mut self) -> Option<NullSurface> {
        self.bound.take()
    }

    fn fill(&mut self, _: &Geometry, _: Affine, _: Color, _: f32) {}

    fn draw_surface(&mut self, _: &NullSurface, _: Affine, _: f32) {}
}

/// A writer whose bytes stay readable after the sink is boxed into a store.
#[derive(Clone, Debug, Default)]
pub(crate) struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn store_with_node() -> (SceneStore<NullSurface>, NodeId) {
    let mut store = SceneStore::new();
    let node = store.create_node();
    store.set_content(
        node,
        Some(Content::fill(
            Geometry::Rect(Rect::new(0.0, 0.0, 20.0, 10.0)),
            Color::WHITE,
        )),
    );
    (store, node)
}

/// Caches a 20x10 node, renders `frames` frames, then uncaches it, with the
/// sink built by `make` installed throughout. Returns everything written.
pub(crate) fn cached_frame<T, F>(frames: usize, make: F) -> Vec<u8>
where
    T: TraceSink + 'static,
    F: FnOnce(SharedBuf) -> T,
{
    let buf = SharedBuf::default();
    let (mut store, node) = store_with_node();
    store.set_trace_sink(Box::new(make(buf.clone())));
    store.set_cached(node, true);
    let mut backend = NullBackend::default();
    for _ in 0..frames {
        store.update_transforms();
        store.render_roots(&mut backend);
    }
    store.set_cached(node, false);
    drop(store.take_trace_sink());
    buf.0.take()
}
