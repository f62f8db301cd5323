// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON-lines trace sinks for snapcache diagnostics.
//!
//! This crate provides [`TraceSink`](snapcache_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`json::JsonLinesSink`]: one JSON object per line, for tooling.

pub mod json;
pub mod pretty;

#[cfg(test)]
mod testing;
