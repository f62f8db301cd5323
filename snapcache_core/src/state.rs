// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Save/restore disciplines for renderer-global state.
//!
//! A snapshot renders into a fresh surface from inside a frame that is already
//! rendering somewhere else. Whatever the renderer considers "current" has to
//! be put back exactly as it was afterwards, however deeply snapshots nest.
//!
//! - [`TargetStack`] is the GPU shape of that state: a stack of render
//!   targets and a stack of active filters. Saving moves both stacks out,
//!   leaving them empty for the snapshot; restoring moves them back.
//! - [`CurrentContext`] is the raster shape: a single current drawing
//!   context that is taken on save and put back on restore.
//! - [`RenderScope`] ties either one to a scope: it saves on entry and
//!   restores when dropped.

use alloc::vec::Vec;
use core::fmt;
use core::mem;
use core::ops::{Deref, DerefMut};

use crate::backend::{OffscreenSurface, RenderBackend};
use crate::effect::Effect;

// ---------------------------------------------------------------------------
// TargetStack
// ---------------------------------------------------------------------------

/// A render-target stack plus a filter stack.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetStack<T> {
    targets: Vec<T>,
    filters: Vec<Effect>,
}

/// The contents of a [`TargetStack`] moved out by [`TargetStack::save`].
#[derive(Clone, Debug, PartialEq)]
pub struct SavedStack<T> {
    targets: Vec<T>,
    filters: Vec<Effect>,
}

impl<T> SavedStack<T> {
    /// Number of saved targets.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.targets.len()
    }
}

impl<T> Default for TargetStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TargetStack<T> {
    /// Creates an empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            targets: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Pushes a target; it becomes the one draws go to.
    pub fn push_target(&mut self, target: T) {
        self.targets.push(target);
    }

    /// Pops the top target.
    pub fn pop_target(&mut self) -> Option<T> {
        self.targets.pop()
    }

    /// Returns the top target.
    #[must_use]
    pub fn top(&self) -> Option<&T> {
        self.targets.last()
    }

    /// Returns the top target mutably.
    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.targets.last_mut()
    }

    /// Number of targets on the stack.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.targets.len()
    }

    /// All targets, bottom first.
    #[must_use]
    pub fn targets(&self) -> &[T] {
        &self.targets
    }

    /// Enters a filter pass.
    pub fn push_filter(&mut self, effect: Effect) {
        self.filters.push(effect);
    }

    /// Leaves the innermost filter pass.
    pub fn pop_filter(&mut self) -> Option<Effect> {
        self.filters.pop()
    }

    /// Active filters, outermost first.
    #[must_use]
    pub fn filters(&self) -> &[Effect] {
        &self.filters
    }

    /// Moves both stacks out, leaving this one empty.
    pub fn save(&mut self) -> SavedStack<T> {
        SavedStack {
            targets: mem::take(&mut self.targets),
            filters: mem::take(&mut self.filters),
        }
    }

    /// Reinstates stacks moved out by [`save`](Self::save).
    ///
    /// Anything still on this stack is dropped.
    pub fn restore(&mut self, saved: SavedStack<T>) {
        self.targets = saved.targets;
        self.filters = saved.filters;
    }
}

// ---------------------------------------------------------------------------
// CurrentContext
// ---------------------------------------------------------------------------

/// A single current drawing context.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrentContext<T> {
    current: Option<T>,
}

impl<T> Default for CurrentContext<T> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<T> CurrentContext<T> {
    /// Creates a context whose current target is `initial`.
    #[must_use]
    pub const fn new(initial: T) -> Self {
        Self {
            current: Some(initial),
        }
    }

    /// Returns the current target.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Returns the current target mutably.
    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.current.as_mut()
    }

    /// Makes `target` current, returning the previous one.
    pub fn replace(&mut self, target: T) -> Option<T> {
        self.current.replace(target)
    }

    /// Removes the current target.
    pub fn take(&mut self) -> Option<T> {
        self.current.take()
    }

    /// Takes the current target for later [`restore`](Self::restore).
    pub fn save(&mut self) -> Option<T> {
        self.current.take()
    }

    /// Puts back a target taken by [`save`](Self::save).
    pub fn restore(&mut self, saved: Option<T>) {
        self.current = saved;
    }
}

// ---------------------------------------------------------------------------
// RenderScope
// ---------------------------------------------------------------------------

/// Saves a backend's render state on creation and restores it on drop.
///
/// A surface left bound when the scope closes is released with
/// [`OffscreenSurface::destroy`].
///
/// Dereferences to the backend, so everything rendered through the scope goes
/// to whatever target was bound inside it.
pub struct RenderScope<'a, B: RenderBackend> {
    backend: &'a mut B,
    saved: Option<B::SavedState>,
}

impl<B: RenderBackend> fmt::Debug for RenderScope<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderScope")
            .field("restored", &self.saved.is_none())
            .finish_non_exhaustive()
    }
}

impl<'a, B: RenderBackend> RenderScope<'a, B> {
    /// Saves `backend`'s state and opens the scope.
    pub fn enter(backend: &'a mut B) -> Self {
        let saved = backend.save_state();
        Self {
            backend,
            saved: Some(saved),
        }
    }
}

impl<B: RenderBackend> Deref for RenderScope<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: RenderBackend> DerefMut for RenderScope<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: RenderBackend> Drop for RenderScope<'_, B> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take()
            && let Some(orphan) = self.backend.restore_state(saved)
        {
            orphan.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::EffectId;
    use crate::testing::{StackBackend, TestSurface};

    #[test]
    fn save_empties_and_restore_reinstates() {
        let mut stack = TargetStack::new();
        stack.push_target('a');
        stack.push_target('b');
        stack.push_filter(Effect::new(EffectId(1), 2.0));
        let before = stack.clone();

        let saved = stack.save();
        assert_eq!(saved.depth(), 2);
        assert_eq!(stack.depth(), 0, "saved stack starts empty");
        assert!(stack.filters().is_empty(), "saved filters start empty");

        stack.push_target('x');
        stack.push_filter(Effect::new(EffectId(9), 0.0));
        stack.restore(saved);
        assert_eq!(stack, before);
    }

    #[test]
    fn nested_saves_unwind_in_order() {
        let mut stack = TargetStack::new();
        stack.push_target(1);
        let outer = stack.save();
        stack.push_target(2);
        let inner = stack.save();
        stack.push_target(3);
        stack.restore(inner);
        assert_eq!(stack.targets(), &[2]);
        stack.restore(outer);
        assert_eq!(stack.targets(), &[1]);
    }

    #[test]
    fn current_context_round_trip() {
        let mut ctx = CurrentContext::new("main");
        let saved = ctx.save();
        assert!(ctx.current().is_none(), "save leaves no current target");
        assert_eq!(ctx.replace("offscreen"), None);
        assert_eq!(ctx.take(), Some("offscreen"));
        ctx.restore(saved);
        assert_eq!(ctx.current(), Some(&"main"));
    }

    #[test]
    fn render_scope_restores_on_drop() {
        let mut backend = StackBackend::new();
        backend.push_filter(&Effect::new(EffectId(4), 1.0));
        let before = backend.stack.clone();
        {
            let mut scope = RenderScope::enter(&mut backend);
            assert_eq!(scope.stack.depth(), 0, "scope starts from an empty stack");
            scope.bind_target(TestSurface::new(1, 4, 4), true);
            assert_eq!(scope.stack.depth(), 1, "bound surface is on top");
        }
        assert_eq!(backend.stack, before);
    }

    #[test]
    fn render_scope_releases_surface_left_bound() {
        let mut backend = StackBackend::new();
        let surface = TestSurface::new(3, 4, 4);
        let releases = surface.releases();
        {
            let mut scope = RenderScope::enter(&mut backend);
            scope.bind_target(surface, true);
        }
        assert_eq!(*releases.borrow(), [3], "released once on close");
        assert_eq!(backend.stack.depth(), 1, "main target is back");
    }
}
