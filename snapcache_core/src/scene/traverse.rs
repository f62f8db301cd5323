// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, NodeId};

/// An iterator over the direct children of a node.
///
/// Created by [`SceneStore::children`](super::SceneStore::children).
#[derive(Debug)]
pub struct Children<'a> {
    next_sibling: &'a [u32],
    generation: &'a [u32],
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(next_sibling: &'a [u32], generation: &'a [u32], first: u32) -> Self {
        Self {
            next_sibling,
            generation,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.next_sibling[idx as usize];
        Some(NodeId {
            idx,
            generation: self.generation[idx as usize],
        })
    }
}
