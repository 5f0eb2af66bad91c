#![forbid(unsafe_code)]

//! slotkit public facade crate.
//!
//! A multi-LoRA node shows a variable-length list of slots inside one graph
//! node. Users add, remove, reorder, enable and tune slots; the node saves
//! them with the graph and restores them from older saved shapes.
//!
//! This crate holds the node-level pieces: the [`node::SlotListNode`]
//! controller, strength mode [`migration`], save/restore in [`persist`], and
//! backend-side [`stack`] resolution. Lower layers are re-exported.
//!
//! ```rust,ignore
//! use slotkit::prelude::*;
//!
//! let mut host = RecordingHost::new();
//! let mut node = SlotListNode::new(SlotKitConfig::default());
//! node.on_created(&mut host);
//! node.add(Selector::from("123@4:Detail Tweaker"), &mut host);
//! let saved = node.serialize();
//! ```

use std::fmt;

pub mod config;
pub mod host;
pub mod lifecycle;
pub mod migration;
pub mod node;
pub mod persist;
pub mod stack;
pub mod widget_list;

pub use config::{ConfigError, SlotKitConfig};
pub use host::{MenuTarget, NodeHost, RecordingHost};
pub use lifecycle::{ExtensionChain, NodeExtension};
pub use node::SlotListNode;
pub use persist::{PersistError, RestoreShape, SavedNode};
pub use stack::{LoraApplication, LoraInfo, ResolvedStack, merge_lora_info, resolve_stack};
pub use widget_list::{NodeWidget, WidgetList};

// --- Core re-exports -------------------------------------------------------

pub use slotkit_core::catalog::{
    CatalogCache, CatalogEntry, CatalogError, CatalogSnapshot, CatalogSource, ModelFolder,
};
pub use slotkit_core::event::{
    Event, KeyCode, KeyEvent, Modifiers, PointerButton, PointerEvent, PointerEventKind,
};
pub use slotkit_core::geometry::{Point, Rect};
pub use slotkit_core::gesture::GestureConfig;
pub use slotkit_core::record::{SlotRecord, StrengthChannel, StrengthMode};
pub use slotkit_core::selector::{ModelRef, Selector};

// --- Layout / widget re-exports --------------------------------------------

pub use slotkit_layout::LayoutMetrics;
pub use slotkit_widgets::{
    BaseModelFilter, Canvas, ContextAction, DisplayList, Menu, MenuChoice, MenuItem, Theme,
    ToggleState,
};

// --- Errors ---------------------------------------------------------------

/// Any error a slotkit entry point can return.
#[derive(Debug)]
pub enum Error {
    Config(ConfigError),
    Persist(PersistError),
    Catalog(CatalogError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Persist(err) => write!(f, "{err}"),
            Self::Catalog(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Persist(err) => Some(err),
            Self::Catalog(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<PersistError> for Error {
    fn from(err: PersistError) -> Self {
        Self::Persist(err)
    }
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

/// Standard result type for slotkit APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        BaseModelFilter, CatalogCache, CatalogSnapshot, Error, MenuChoice, MenuTarget, NodeHost,
        RecordingHost, Result, SavedNode, Selector, SlotKitConfig, SlotListNode, SlotRecord,
        StrengthMode,
    };

    pub use crate::{core, layout, widgets};
}

pub use slotkit_core as core;
pub use slotkit_layout as layout;
pub use slotkit_widgets as widgets;
