#![forbid(unsafe_code)]

//! The capabilities a node needs from the graph editor hosting it.
//!
//! A node never holds its host. Every entry point that may talk back takes
//! `&mut dyn NodeHost`, so hosts can keep nodes in whatever container they
//! like.

use std::sync::Arc;

use slotkit_core::catalog::CatalogSnapshot;
use slotkit_core::geometry::Point;
use slotkit_widgets::menu::Menu;

/// What a shown menu was opened for. The host hands it back with the pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuTarget {
    /// Selection menu for the slot at this index.
    Slot(usize),
    /// Selection menu for a slot about to be added.
    AddSlot,
    /// Base-model filter menu.
    Filter,
    /// Context menu for the slot at this index.
    Context(usize),
}

/// Host services used by [`crate::node::SlotListNode`].
pub trait NodeHost {
    /// Request a repaint and mark the graph modified.
    fn set_dirty(&mut self);

    /// Resize the node.
    fn set_size(&mut self, width: f32, height: f32);

    /// Show `menu` at node-local `at`; the pick comes back through
    /// [`crate::node::SlotListNode::on_menu_choice`] with `target`.
    fn show_menu(&mut self, menu: &Menu, at: Point, target: MenuTarget);

    /// Current catalog snapshot.
    fn catalog(&self) -> Arc<CatalogSnapshot>;
}

/// A menu request captured by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShownMenu {
    pub menu: Menu,
    pub at: Point,
    pub target: MenuTarget,
}

/// Headless host that records every request.
///
/// Meant for tests and short headless runs: the size and menu logs grow with
/// every request until [`RecordingHost::clear`] is called.
#[derive(Debug, Default)]
pub struct RecordingHost {
    catalog: Arc<CatalogSnapshot>,
    dirty: usize,
    sizes: Vec<(f32, f32)>,
    menus: Vec<ShownMenu>,
}

impl RecordingHost {
    /// Host with an empty, disconnected catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host serving `catalog`.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Arc<CatalogSnapshot>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Swap the served catalog.
    pub fn set_catalog(&mut self, catalog: Arc<CatalogSnapshot>) {
        self.catalog = catalog;
    }

    /// How many times the node asked to be marked dirty.
    pub fn dirty_count(&self) -> usize {
        self.dirty
    }

    /// Every size request, oldest first.
    pub fn sizes(&self) -> &[(f32, f32)] {
        &self.sizes
    }

    /// The most recent size request.
    pub fn last_size(&self) -> Option<(f32, f32)> {
        self.sizes.last().copied()
    }

    /// Every menu shown, oldest first.
    pub fn menus(&self) -> &[ShownMenu] {
        &self.menus
    }

    /// Remove and return the most recent menu request.
    pub fn take_last_menu(&mut self) -> Option<ShownMenu> {
        self.menus.pop()
    }

    /// Forget recorded requests (the catalog stays).
    pub fn clear(&mut self) {
        self.dirty = 0;
        self.sizes.clear();
        self.menus.clear();
    }
}

impl NodeHost for RecordingHost {
    fn set_dirty(&mut self) {
        self.dirty += 1;
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.sizes.push((width, height));
    }

    fn show_menu(&mut self, menu: &Menu, at: Point, target: MenuTarget) {
        self.menus.push(ShownMenu {
            menu: menu.clone(),
            at,
            target,
        });
    }

    fn catalog(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.catalog)
    }
}
