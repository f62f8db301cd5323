// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON-lines trace output.
//!
//! [`JsonLinesSink`] writes each event as one JSON object followed by a
//! newline. Every object carries an `"event"` tag and a `"node"` object with
//! the handle's `index` and `generation`.

use std::io::Write;

use serde_json::{Value, json};

use snapcache_core::cache::CacheMode;
use snapcache_core::scene::NodeId;
use snapcache_core::trace::{
    CacheModeEvent, CachedDrawEvent, SnapshotEvent, SnapshotFailedEvent, SnapshotFailure,
    SurfaceReleasedEvent, TraceSink,
};

/// Writes one JSON object per event.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSink").finish_non_exhaustive()
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn emit(&mut self, value: &Value) {
        let _ = writeln!(self.writer, "{value}");
    }
}

fn node(id: NodeId) -> Value {
    json!({ "index": id.index(), "generation": id.generation() })
}

impl<W: Write> TraceSink for JsonLinesSink<W> {
    fn on_cache_mode(&mut self, e: &CacheModeEvent) {
        let mode = match e.mode {
            CacheMode::Normal => "normal",
            CacheMode::Cached => "cached",
        };
        self.emit(&json!({
            "event": "cache_mode",
            "node": node(e.node),
            "mode": mode,
        }));
    }

    fn on_snapshot(&mut self, e: &SnapshotEvent) {
        self.emit(&json!({
            "event": "snapshot",
            "node": node(e.node),
            "width": e.width,
            "height": e.height,
            "bounds": [e.bounds.x0, e.bounds.y0, e.bounds.x1, e.bounds.y1],
            "anchor": [e.anchor.x, e.anchor.y],
        }));
    }

    fn on_snapshot_failed(&mut self, e: &SnapshotFailedEvent) {
        let (reason, detail) = match e.reason {
            SnapshotFailure::Allocation(err) => ("allocation", Value::String(err.to_string())),
            SnapshotFailure::TargetLost => ("target_lost", Value::Null),
        };
        self.emit(&json!({
            "event": "snapshot_failed",
            "node": node(e.node),
            "width": e.width,
            "height": e.height,
            "reason": reason,
            "detail": detail,
        }));
    }

    fn on_surface_released(&mut self, e: &SurfaceReleasedEvent) {
        self.emit(&json!({
            "event": "surface_released",
            "node": node(e.node),
            "width": e.width,
            "height": e.height,
        }));
    }

    fn on_cached_draw(&mut self, e: &CachedDrawEvent) {
        self.emit(&json!({
            "event": "cached_draw",
            "node": node(e.node),
            "alpha": e.alpha,
        }));
    }
}
