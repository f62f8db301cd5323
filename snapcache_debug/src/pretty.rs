// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use snapcache_core::cache::CacheMode;
use snapcache_core::trace::{
    CacheModeEvent, CachedDrawEvent, SnapshotEvent, SnapshotFailedEvent, SnapshotFailure,
    SurfaceReleasedEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    draws: u64,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("draws", &self.draws)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer, draws: 0 }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer, draws: 0 }
    }

    /// Number of cached draws seen so far.
    #[must_use]
    pub fn cached_draws(&self) -> u64 {
        self.draws
    }

    /// Consumes the sink and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn mode_name(mode: CacheMode) -> &'static str {
    match mode {
        CacheMode::Normal => "normal",
        CacheMode::Cached => "cached",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_cache_mode(&mut self, e: &CacheModeEvent) {
        let _ = writeln!(
            self.writer,
            "[mode] node={}@{} -> {}",
            e.node.index(),
            e.node.generation(),
            mode_name(e.mode),
        );
    }

    fn on_snapshot(&mut self, e: &SnapshotEvent) {
        let _ = writeln!(
            self.writer,
            "[snapshot] node={}@{} surface={}x{} bounds=({:.1}, {:.1}, {:.1}, {:.1}) anchor=({:.3}, {:.3})",
            e.node.index(),
            e.node.generation(),
            e.width,
            e.height,
            e.bounds.x0,
            e.bounds.y0,
            e.bounds.x1,
            e.bounds.y1,
            e.anchor.x,
            e.anchor.y,
        );
    }

    fn on_snapshot_failed(&mut self, e: &SnapshotFailedEvent) {
        let reason = match e.reason {
            SnapshotFailure::Allocation(err) => format!("{err}"),
            SnapshotFailure::TargetLost => "target lost".to_owned(),
        };
        let _ = writeln!(
            self.writer,
            "[snapshot:failed] node={}@{} surface={}x{} reason={reason}",
            e.node.index(),
            e.node.generation(),
            e.width,
            e.height,
        );
    }

    fn on_surface_released(&mut self, e: &SurfaceReleasedEvent) {
        let _ = writeln!(
            self.writer,
            "[release] node={}@{} surface={}x{}",
            e.node.index(),
            e.node.generation(),
            e.width,
            e.height,
        );
    }

    fn on_cached_draw(&mut self, e: &CachedDrawEvent) {
        self.draws += 1;
        let _ = writeln!(
            self.writer,
            "[draw] node={}@{} alpha={:.2}",
            e.node.index(),
            e.node.generation(),
            e.alpha,
        );
    }
}
