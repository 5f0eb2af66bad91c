#![forbid(unsafe_code)]

//! Core: geometry, pointer input, gestures, slot records, and the model catalog.
//!
//! # Role in slotkit
//! `slotkit-core` is the vocabulary layer. It owns the value types that every
//! other crate passes around: canvas-space rectangles, pointer and key events,
//! the per-slot record and its selector, and the shared model catalog.
//!
//! # Primary responsibilities
//! - **Rect / Point**: canvas pixel geometry used for zones and hit testing.
//! - **Event**: normalized pointer, key, and focus events delivered by the host.
//! - **Gesture primitives**: drag sessions and the manual double-click window.
//! - **SlotRecord / Selector**: one LoRA slot's value shape and wire format.
//! - **CatalogCache**: read-mostly, versioned snapshot of the model catalog.
//!
//! # How it fits in the system
//! `slotkit-layout` maps widths to zones using [`geometry::Rect`].
//! `slotkit-widgets` interprets [`event::Event`]s against those zones and
//! mutates [`record::SlotRecord`]s. The `slotkit` facade owns the node-level
//! list and persistence.

pub mod catalog;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod logging;
pub mod record;
pub mod selector;

pub use catalog::{CatalogCache, CatalogEntry, CatalogError, CatalogSnapshot, ModelFolder};
pub use geometry::{Point, Rect};
pub use record::{SlotRecord, StrengthChannel, StrengthMode};
pub use selector::{ModelRef, Selector};
