#![forbid(unsafe_code)]

//! Lifecycle extensions.
//!
//! Hosts that want to layer behavior on a node (extra context entries,
//! bookkeeping on save) register a [`NodeExtension`]. Each hook runs after
//! the node's own handling of the same event, in registration order. Every
//! hook has a no-op default.

use serde_json::Value;
use slotkit_core::geometry::Point;
use slotkit_widgets::menu::Menu;

use crate::host::{MenuTarget, NodeHost};
use crate::node::SlotListNode;
use crate::persist::{RestoreShape, SavedNode};

/// Hooks invoked after the node's built-in lifecycle behavior.
#[allow(unused_variables)]
pub trait NodeExtension {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn on_created(&mut self, node: &mut SlotListNode, host: &mut dyn NodeHost) {}

    fn on_configure(
        &mut self,
        node: &mut SlotListNode,
        saved: &SavedNode,
        shape: RestoreShape,
        host: &mut dyn NodeHost,
    ) {
    }

    fn on_serialize(&self, node: &SlotListNode, saved: &mut SavedNode) {}

    fn on_property_changed(
        &mut self,
        node: &mut SlotListNode,
        name: &str,
        value: &Value,
        host: &mut dyn NodeHost,
    ) {
    }

    /// Append entries to a context menu opened at `at`.
    fn extra_menu_options(&self, node: &SlotListNode, at: Point, target: MenuTarget, menu: &mut Menu) {}
}

/// Registered extensions, in order.
#[derive(Default)]
pub struct ExtensionChain {
    extensions: Vec<Box<dyn NodeExtension>>,
}

impl std::fmt::Debug for ExtensionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.extensions.iter().map(|e| e.name()))
            .finish()
    }
}

impl ExtensionChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension after the existing ones.
    pub fn push(&mut self, extension: Box<dyn NodeExtension>) {
        tracing::debug!(extension = extension.name(), "node extension registered");
        self.extensions.push(extension);
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    /// Run `f` on every extension, in order.
    pub(crate) fn for_each_mut(&mut self, mut f: impl FnMut(&mut dyn NodeExtension)) {
        for extension in &mut self.extensions {
            f(extension.as_mut());
        }
    }

    /// Run `f` on every extension, in order.
    pub(crate) fn for_each(&self, mut f: impl FnMut(&dyn NodeExtension)) {
        for extension in &self.extensions {
            f(extension.as_ref());
        }
    }
}
