// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Post-processing effects attached to nodes.

use core::fmt;

/// Identifies an effect pass known to the backend (blur, glow, ...).
///
/// The core never interprets the id; backends push it onto their filter
/// stack while the owning subtree renders.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectId(pub u32);

impl fmt::Debug for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EffectId({})", self.0)
    }
}

/// A post-processing pass attached to a node.
///
/// `padding` is the number of local-space pixels the effect may draw outside
/// the node's content bounds. A cached snapshot grows by the padding of the
/// node's *first* effect on every side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Effect {
    /// Backend-defined effect pass.
    pub id: EffectId,
    /// Extra room, in local pixels, required on each side.
    pub padding: f64,
}

impl Effect {
    /// Creates an effect with the given padding.
    #[must_use]
    pub const fn new(id: EffectId, padding: f64) -> Self {
        Self { id, padding }
    }
}
