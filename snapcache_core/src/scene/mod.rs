// Copyright 2026 the Snapcache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene store: the host node abstraction the cache layer drives.
//!
//! Nodes live in a struct-of-arrays [`SceneStore`] and are addressed through
//! generational [`NodeId`] handles. Each node has a local transform and alpha,
//! visibility and renderability flags, optional [`Content`], an ordered list
//! of [`Effect`](crate::effect::Effect)s, and a [`Bindings`] record selecting
//! how it renders, updates its world transform, reports bounds, answers hit
//! tests and is destroyed.
//!
//! ```rust
//! use kurbo::{Affine, Rect};
//! use snapcache_core::scene::{Color, Content, Geometry, SceneStore};
//! # use snapcache_core::backend::OffscreenSurface;
//! # struct NoSurface;
//! # impl OffscreenSurface for NoSurface {
//! #     fn width(&self) -> u32 { 1 }
//! #     fn height(&self) -> u32 { 1 }
//! #     fn destroy(self) {}
//! # }
//!
//! let mut scene = SceneStore::<NoSurface>::new();
//! let root = scene.create_node();
//! let card = scene.create_node();
//! scene.add_child(root, card);
//! scene.set_transform(card, Affine::translate((20.0, 10.0)));
//! scene.set_content(
//!     card,
//!     Some(Content::fill(
//!         Geometry::Rect(Rect::new(0.0, 0.0, 30.0, 30.0)),
//!         Color::rgb8(200, 40, 40),
//!     )),
//! );
//! scene.update_transforms();
//! assert_eq!(scene.bounds(root), Rect::new(20.0, 10.0, 50.0, 40.0));
//! ```

mod behavior;
mod content;
mod id;
mod store;
mod traverse;
mod update;

pub use behavior::{
    Bindings, BoundsBehavior, DestroyBehavior, HitTestBehavior, RenderBehavior, TransformBehavior,
};
pub use content::{Color, Content, Geometry};
pub use id::{INVALID, NodeId};
pub use store::{NodeFlags, SceneStore};
pub use traverse::Children;
