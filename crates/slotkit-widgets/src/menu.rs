#![forbid(unsafe_code)]

//! Menus: model selection, base-model filter, and slot context actions.
//!
//! Menus are plain data. The host renders them however it renders context
//! menus and hands the picked [`MenuChoice`] back to the node.
//!
//! # Selection menu shape
//!
//! ```text
//! None
//! ── flat list when every entry shares one base model ──
//! SD 1.5 ▸  entries in catalog order
//! SDXL   ▸  ...
//! Other  ▸  entries with no base model
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use slotkit_core::catalog::{CatalogSnapshot, ModelFolder};
use slotkit_core::selector::{NONE_LITERAL, Selector};

/// Group label for entries without a base model.
pub const OTHER_GROUP: &str = "Other";
/// Label of the unfiltered filter option.
pub const ALL_FILTER: &str = "All";

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Node-level base-model filter; narrows selection menus only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum BaseModelFilter {
    #[default]
    All,
    Only(String),
}

impl BaseModelFilter {
    /// Parse the property value; `"All"` and the empty string mean no filter.
    pub fn from_property(value: &str) -> Self {
        if value.is_empty() || value == ALL_FILTER {
            Self::All
        } else {
            Self::Only(value.to_owned())
        }
    }

    /// Whether an entry with this base model passes.
    pub fn admits(&self, base_model: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => base_model == Some(wanted.as_str()),
        }
    }
}

impl fmt::Display for BaseModelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_FILTER),
            Self::Only(base) => f.write_str(base),
        }
    }
}

impl Serialize for BaseModelFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BaseModelFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or(Self::All, |s| Self::from_property(&s)))
    }
}

// ---------------------------------------------------------------------------
// Menu data
// ---------------------------------------------------------------------------

/// Per-slot context menu actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextAction {
    Toggle,
    MoveUp,
    MoveDown,
    Remove,
}

impl ContextAction {
    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Toggle => "Toggle",
            Self::MoveUp => "Move Up",
            Self::MoveDown => "Move Down",
            Self::Remove => "Remove",
        }
    }
}

/// Value carried by a menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Select(Selector),
    Filter(BaseModelFilter),
    Context(ContextAction),
}

/// One menu row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Entry {
        label: String,
        choice: MenuChoice,
        enabled: bool,
    },
    Submenu {
        label: String,
        items: Vec<MenuItem>,
    },
}

impl MenuItem {
    /// Enabled entry.
    pub fn entry(label: impl Into<String>, choice: MenuChoice) -> Self {
        Self::Entry {
            label: label.into(),
            choice,
            enabled: true,
        }
    }

    /// Row label.
    pub fn label(&self) -> &str {
        match self {
            Self::Entry { label, .. } | Self::Submenu { label, .. } => label,
        }
    }
}

/// A list of menu rows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Menu {
    pub items: Vec<MenuItem>,
}

impl Menu {
    /// Whether the only choice is `None`.
    pub fn is_none_only(&self) -> bool {
        matches!(
            self.items.as_slice(),
            [MenuItem::Entry { choice: MenuChoice::Select(sel), .. }] if sel.is_none()
        )
    }

    /// Depth-first list of every entry's choice.
    pub fn choices(&self) -> Vec<&MenuChoice> {
        fn walk<'a>(items: &'a [MenuItem], out: &mut Vec<&'a MenuChoice>) {
            for item in items {
                match item {
                    MenuItem::Entry { choice, .. } => out.push(choice),
                    MenuItem::Submenu { items, .. } => walk(items, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.items, &mut out);
        out
    }

    /// Top-level labels, in order.
    pub fn labels(&self) -> Vec<&str> {
        self.items.iter().map(MenuItem::label).collect()
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Selection menu for the LoRA folder of `snapshot`, narrowed by `filter`.
pub fn build_selection_menu(snapshot: &CatalogSnapshot, filter: &BaseModelFilter) -> Menu {
    let mut items = vec![MenuItem::entry(NONE_LITERAL, MenuChoice::Select(Selector::None))];

    let entries: Vec<_> = snapshot
        .entries(ModelFolder::Loras)
        .iter()
        .filter(|e| filter.admits(e.base_model.as_deref()))
        .collect();

    let mut groups: BTreeMap<&str, Vec<MenuItem>> = BTreeMap::new();
    for entry in &entries {
        let group = entry.base_model.as_deref().unwrap_or(OTHER_GROUP);
        groups
            .entry(group)
            .or_default()
            .push(MenuItem::entry(entry.name.clone(), MenuChoice::Select(entry.selector())));
    }

    if groups.len() <= 1 {
        items.extend(groups.into_values().flatten());
    } else {
        items.extend(groups.into_iter().map(|(label, items)| MenuItem::Submenu {
            label: label.to_owned(),
            items,
        }));
    }
    Menu { items }
}

/// Filter menu: `All`, then each distinct base model in sorted order.
pub fn build_filter_menu(snapshot: &CatalogSnapshot) -> Menu {
    let mut items = vec![MenuItem::entry(
        ALL_FILTER,
        MenuChoice::Filter(BaseModelFilter::All),
    )];
    items.extend(
        snapshot
            .base_models(ModelFolder::Loras)
            .into_iter()
            .map(|base| {
                MenuItem::entry(base.clone(), MenuChoice::Filter(BaseModelFilter::Only(base)))
            }),
    );
    Menu { items }
}

/// Context menu for slot `index` of `len`; moves past an edge are disabled.
pub fn build_context_menu(index: usize, len: usize) -> Menu {
    let item = |action: ContextAction, enabled: bool| MenuItem::Entry {
        label: action.label().to_owned(),
        choice: MenuChoice::Context(action),
        enabled,
    };
    Menu {
        items: vec![
            item(ContextAction::Toggle, true),
            item(ContextAction::MoveUp, index > 0),
            item(ContextAction::MoveDown, index + 1 < len),
            item(ContextAction::Remove, true),
        ],
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Selection menu memoized by catalog version and filter.
#[derive(Debug, Default)]
pub struct MenuCache {
    key: Option<(u64, BaseModelFilter)>,
    menu: Arc<Menu>,
}

impl MenuCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached menu, rebuilt when the catalog version or filter changed.
    pub fn get(&mut self, snapshot: &CatalogSnapshot, filter: &BaseModelFilter) -> Arc<Menu> {
        let fresh = matches!(
            &self.key,
            Some((version, cached)) if *version == snapshot.version() && cached == filter
        );
        if !fresh {
            tracing::debug!(
                catalog_version = snapshot.version(),
                filter = %filter,
                "selection menu rebuilt"
            );
            self.menu = Arc::new(build_selection_menu(snapshot, filter));
            self.key = Some((snapshot.version(), filter.clone()));
        }
        Arc::clone(&self.menu)
    }

    /// Forget the cached menu.
    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
