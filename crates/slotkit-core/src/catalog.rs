#![forbid(unsafe_code)]

//! Model catalog: entries, version expansion, and the shared snapshot cache.
//!
//! The catalog is populated by an external fetch path (a [`CatalogSource`]
//! implementation talking to the model manager backend) and read by every
//! node on the canvas. Readers never block: they load an immutable
//! [`CatalogSnapshot`] from [`CatalogCache`] and compare its `version` with
//! the one they last derived menus from.
//!
//! # Invariants
//!
//! 1. Every publish, refresh, failed fetch, or connection change bumps
//!    `version` by one.
//! 2. A snapshot never changes after it has been loaded.
//! 3. An empty or missing folder is not an error: combo lists degrade to a
//!    single placeholder string. A failed fetch degrades the same way until
//!    the next successful publish of that folder.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::selector::{ModelRef, Selector};

/// Combo placeholder for an empty folder.
pub const NO_MODELS_PLACEHOLDER: &str = "(no models found)";
/// Combo placeholder while the backend is not connected.
pub const NOT_CONNECTED_PLACEHOLDER: &str = "(not connected)";
/// Combo placeholder after the last fetch of a folder failed.
pub const LOAD_ERROR_PLACEHOLDER: &str = "(error loading models)";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures at the catalog source boundary.
#[derive(Debug)]
pub enum CatalogError {
    /// Credentials missing, invalid, or rejected.
    Auth(String),
    /// The backend answered with an error.
    Api {
        /// HTTP status, when there was one.
        code: Option<u16>,
        /// Backend-supplied message.
        message: String,
    },
    /// Folder name outside the known set.
    UnknownFolder(String),
    /// Response body did not decode.
    Decode(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(msg) => write!(f, "authentication failed: {msg}"),
            Self::Api {
                code: Some(code),
                message,
            } => write!(f, "API error ({code}): {message}"),
            Self::Api {
                code: None,
                message,
            } => write!(f, "API error: {message}"),
            Self::UnknownFolder(folder) => write!(f, "unknown folder: {folder}"),
            Self::Decode(e) => write!(f, "malformed catalog response: {e}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

/// Model folders the backend serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelFolder {
    DiffusionModels,
    Checkpoints,
    Loras,
    Vae,
}

impl ModelFolder {
    /// All folders, in sorted name order.
    pub const ALL: [ModelFolder; 4] = [
        ModelFolder::Checkpoints,
        ModelFolder::DiffusionModels,
        ModelFolder::Loras,
        ModelFolder::Vae,
    ];

    /// Folder name as used in URLs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DiffusionModels => "diffusion_models",
            Self::Checkpoints => "checkpoints",
            Self::Loras => "loras",
            Self::Vae => "vae",
        }
    }

    /// Backend category label for this folder.
    pub fn category(self) -> &'static str {
        match self {
            Self::DiffusionModels => "Diffusion Model",
            Self::Checkpoints => "Checkpoint",
            Self::Loras => "LoRA",
            Self::Vae => "VAE",
        }
    }
}

impl FromStr for ModelFolder {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| CatalogError::UnknownFolder(s.to_owned()))
    }
}

impl fmt::Display for ModelFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// One selectable model version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: u64,
    #[serde(default)]
    pub version_id: Option<u64>,
    /// Display name (`"Model - Version"` when a model has several local versions).
    pub name: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub version_name: Option<String>,
    #[serde(default)]
    pub base_model: Option<String>,
}

impl CatalogEntry {
    /// Minimal entry, mostly for tests and fixtures.
    pub fn new(id: u64, version_id: Option<u64>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            version_id,
            model_name: name.clone(),
            name,
            version_name: None,
            base_model: None,
        }
    }

    /// Builder: attach a base-model tag.
    #[must_use]
    pub fn with_base_model(mut self, base: impl Into<String>) -> Self {
        self.base_model = Some(base.into());
        self
    }

    /// The selector a slot stores when this entry is chosen.
    pub fn selector(&self) -> Selector {
        Selector::Model(ModelRef::new(self.id, self.version_id, self.name.clone()))
    }

    /// Combo-box string, `id@version:name` or `id:name`.
    pub fn combo_value(&self) -> String {
        self.selector().to_string()
    }
}

/// A model record as returned by the backend listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModel {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub base_model: Option<String>,
    #[serde(default)]
    pub versions: Option<Vec<RawVersion>>,
}

/// A version record nested in [`RawModel`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVersion {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub is_local: bool,
    #[serde(default)]
    pub base_model: Option<String>,
}

/// Expand backend models into one entry per locally available version.
///
/// Models without version data become a single unversioned entry; models
/// whose versions are all remote are dropped.
pub fn expand_versions(raw_models: &[RawModel]) -> Vec<CatalogEntry> {
    let mut expanded = Vec::with_capacity(raw_models.len());
    for model in raw_models {
        let Some(versions) = model.versions.as_deref().filter(|v| !v.is_empty()) else {
            expanded.push(CatalogEntry {
                id: model.id,
                version_id: None,
                name: model.name.clone(),
                model_name: model.name.clone(),
                version_name: None,
                base_model: model.base_model.clone(),
            });
            continue;
        };

        let local: Vec<&RawVersion> = versions.iter().filter(|v| v.is_local).collect();
        let multi = local.len() > 1;
        for v in local {
            let name = if multi {
                format!("{} - {}", model.name, v.name)
            } else {
                model.name.clone()
            };
            expanded.push(CatalogEntry {
                id: model.id,
                version_id: Some(v.id),
                name,
                model_name: model.name.clone(),
                version_name: Some(v.name.clone()),
                base_model: v.base_model.clone().or_else(|| model.base_model.clone()),
            });
        }
    }
    expanded
}

// ---------------------------------------------------------------------------
// Source boundary
// ---------------------------------------------------------------------------

/// The external catalog backend ("list models in folder" and "refresh").
pub trait CatalogSource {
    /// Entries for one folder, already version-expanded.
    fn list_models(&self, folder: ModelFolder) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// Ask the backend to drop its own cached listing.
    fn refresh(&self) -> Result<(), CatalogError>;
}

// ---------------------------------------------------------------------------
// Snapshot + cache
// ---------------------------------------------------------------------------

/// Immutable view of the catalog at one version.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    version: u64,
    connected: bool,
    folders: BTreeMap<ModelFolder, Arc<[CatalogEntry]>>,
    failed: BTreeSet<ModelFolder>,
}

impl CatalogSnapshot {
    /// Build a connected snapshot directly (fixtures, single-node hosts).
    pub fn with_entries(folder: ModelFolder, entries: Vec<CatalogEntry>) -> Self {
        let mut folders = BTreeMap::new();
        folders.insert(folder, Arc::from(entries));
        Self {
            version: 1,
            connected: true,
            folders,
            failed: BTreeSet::new(),
        }
    }

    /// Monotonic version counter.
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the fetch path reported a live connection.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether the last fetch of `folder` failed.
    #[inline]
    pub fn is_failed(&self, folder: ModelFolder) -> bool {
        self.failed.contains(&folder)
    }

    /// Entries for a folder; empty when nothing was published.
    pub fn entries(&self, folder: ModelFolder) -> &[CatalogEntry] {
        self.folders.get(&folder).map_or(&[][..], |e| &e[..])
    }

    /// Combo strings for single-slot loaders, with placeholders.
    pub fn combo_values(&self, folder: ModelFolder) -> Vec<String> {
        if !self.connected {
            return vec![NOT_CONNECTED_PLACEHOLDER.to_owned()];
        }
        if self.is_failed(folder) {
            return vec![LOAD_ERROR_PLACEHOLDER.to_owned()];
        }
        let entries = self.entries(folder);
        if entries.is_empty() {
            return vec![NO_MODELS_PLACEHOLDER.to_owned()];
        }
        entries.iter().map(CatalogEntry::combo_value).collect()
    }

    /// Distinct base-model tags in a folder, sorted.
    pub fn base_models(&self, folder: ModelFolder) -> Vec<String> {
        let mut tags: Vec<String> = self
            .entries(folder)
            .iter()
            .filter_map(|e| e.base_model.clone())
            .collect();
        tags.sort();
        tags.dedup();
        tags
    }
}

/// Shared, versioned catalog cache.
///
/// Only the fetch path writes; nodes load snapshots.
#[derive(Debug, Default)]
pub struct CatalogCache {
    inner: ArcSwap<CatalogSnapshot>,
}

impl CatalogCache {
    /// Empty, disconnected cache at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.inner.load_full()
    }

    /// Current version.
    pub fn version(&self) -> u64 {
        self.inner.load().version
    }

    /// Replace one folder's entries and mark the cache connected.
    pub fn publish(&self, folder: ModelFolder, entries: Vec<CatalogEntry>) {
        let entries: Arc<[CatalogEntry]> = Arc::from(entries);
        let prev = self.inner.rcu(|cur| {
            let mut next = CatalogSnapshot::clone(cur);
            next.folders.insert(folder, Arc::clone(&entries));
            next.failed.remove(&folder);
            next.connected = true;
            next.version += 1;
            next
        });
        tracing::debug!(
            folder = folder.as_str(),
            count = entries.len(),
            version = prev.version + 1,
            "catalog published"
        );
    }

    /// Drop every folder so the next read triggers a re-fetch.
    pub fn refresh(&self) {
        self.inner.rcu(|cur| CatalogSnapshot {
            version: cur.version + 1,
            connected: cur.connected,
            ..CatalogSnapshot::default()
        });
        tracing::debug!(version = self.version(), "catalog refreshed");
    }

    /// Record a connection change; always clears cached folders.
    pub fn set_connected(&self, connected: bool) {
        self.inner.rcu(|cur| CatalogSnapshot {
            version: cur.version + 1,
            connected,
            ..CatalogSnapshot::default()
        });
    }

    /// Fetch one folder from `source` and publish it.
    ///
    /// On failure the snapshot records it: an auth error marks the cache
    /// disconnected, any other error marks `folder` failed. The error is
    /// still returned.
    pub fn fetch_from(
        &self,
        source: &dyn CatalogSource,
        folder: ModelFolder,
    ) -> Result<usize, CatalogError> {
        match source.list_models(folder) {
            Ok(entries) => {
                let count = entries.len();
                self.publish(folder, entries);
                Ok(count)
            }
            Err(CatalogError::Auth(msg)) => {
                tracing::warn!(folder = folder.as_str(), error = %msg, "catalog authentication failed");
                self.set_connected(false);
                Err(CatalogError::Auth(msg))
            }
            Err(err) => {
                tracing::warn!(folder = folder.as_str(), error = %err, "failed to list models");
                self.mark_failed(folder);
                Err(err)
            }
        }
    }

    /// Ask `source` to refresh, drop cached folders, then re-fetch `folder`.
    pub fn refresh_from(
        &self,
        source: &dyn CatalogSource,
        folder: ModelFolder,
    ) -> Result<usize, CatalogError> {
        source.refresh()?;
        self.refresh();
        self.fetch_from(source, folder)
    }

    fn mark_failed(&self, folder: ModelFolder) {
        self.inner.rcu(|cur| {
            let mut next = CatalogSnapshot::clone(cur);
            next.folders.remove(&folder);
            next.failed.insert(folder);
            next.version += 1;
            next
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> Vec<RawModel> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn expand_model_without_versions() {
        let models = raw(json!([{"id": 1, "name": "Plain", "baseModel": "SDXL"}]));
        let entries = expand_versions(&models);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].version_id, None);
        assert_eq!(entries[0].combo_value(), "1:Plain");
        assert_eq!(entries[0].base_model.as_deref(), Some("SDXL"));
    }

    #[test]
    fn expand_multi_version_names_and_base_fallback() {
        let models = raw(json!([{
            "id": 7, "name": "Style", "baseModel": "SD 1.5",
            "versions": [
                {"id": 70, "name": "v1", "isLocal": true},
                {"id": 71, "name": "v2", "isLocal": true, "baseModel": "SDXL"},
                {"id": 72, "name": "v3", "isLocal": false}
            ]
        }]));
        let entries = expand_versions(&models);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Style - v1");
        assert_eq!(entries[0].base_model.as_deref(), Some("SD 1.5"));
        assert_eq!(entries[1].combo_value(), "7@71:Style - v2");
        assert_eq!(entries[1].base_model.as_deref(), Some("SDXL"));
    }

    #[test]
    fn expand_single_local_version_keeps_model_name() {
        let models = raw(json!([
            {"id": 3, "name": "Solo", "versions": [{"id": 30, "name": "v1", "isLocal": true}]},
            {"id": 4, "name": "Remote", "versions": [{"id": 40, "name": "v1", "isLocal": false}]}
        ]));
        let entries = expand_versions(&models);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Solo");
        assert_eq!(entries[0].combo_value(), "3@30:Solo");
    }

    #[test]
    fn folder_names() {
        assert_eq!("loras".parse::<ModelFolder>().ok(), Some(ModelFolder::Loras));
        assert!(matches!(
            "embeddings".parse::<ModelFolder>(),
            Err(CatalogError::UnknownFolder(_))
        ));
        assert_eq!(ModelFolder::DiffusionModels.category(), "Diffusion Model");
    }

    #[test]
    fn cache_versions_bump_on_every_write() {
        let cache = CatalogCache::new();
        assert_eq!(cache.version(), 0);
        cache.publish(ModelFolder::Loras, vec![CatalogEntry::new(1, None, "a")]);
        assert_eq!(cache.version(), 1);
        let before = cache.snapshot();
        cache.refresh();
        assert_eq!(cache.version(), 2);
        // Loaded snapshots are immutable.
        assert_eq!(before.entries(ModelFolder::Loras).len(), 1);
        assert!(cache.snapshot().entries(ModelFolder::Loras).is_empty());
    }

    #[test]
    fn combo_placeholders() {
        let cache = CatalogCache::new();
        assert_eq!(
            cache.snapshot().combo_values(ModelFolder::Loras),
            vec![NOT_CONNECTED_PLACEHOLDER]
        );
        cache.set_connected(true);
        assert_eq!(
            cache.snapshot().combo_values(ModelFolder::Loras),
            vec![NO_MODELS_PLACEHOLDER]
        );
    }

    #[test]
    fn base_models_sorted_distinct() {
        let snap = CatalogSnapshot::with_entries(
            ModelFolder::Loras,
            vec![
                CatalogEntry::new(1, None, "a").with_base_model("SDXL"),
                CatalogEntry::new(2, None, "b").with_base_model("Flux"),
                CatalogEntry::new(3, None, "c").with_base_model("SDXL"),
                CatalogEntry::new(4, None, "d"),
            ],
        );
        assert_eq!(snap.base_models(ModelFolder::Loras), vec!["Flux", "SDXL"]);
    }

    struct FixedSource(Vec<CatalogEntry>);

    impl CatalogSource for FixedSource {
        fn list_models(&self, folder: ModelFolder) -> Result<Vec<CatalogEntry>, CatalogError> {
            if folder == ModelFolder::Loras {
                Ok(self.0.clone())
            } else {
                Err(CatalogError::Api {
                    code: Some(500),
                    message: "boom".into(),
                })
            }
        }

        fn refresh(&self) -> Result<(), CatalogError> {
            Ok(())
        }
    }

    #[test]
    fn fetch_from_source_publishes() {
        let cache = CatalogCache::new();
        let source = FixedSource(vec![CatalogEntry::new(9, Some(1), "n")]);
        assert_eq!(cache.fetch_from(&source, ModelFolder::Loras).ok(), Some(1));
        let err = cache.fetch_from(&source, ModelFolder::Vae);
        assert_eq!(
            err.map_err(|e| e.to_string()).err().as_deref(),
            Some("API error (500): boom")
        );
        assert_eq!(cache.version(), 2);
    }

    #[test]
    fn failed_fetch_shows_error_placeholder_until_next_publish() {
        let cache = CatalogCache::new();
        let source = FixedSource(vec![CatalogEntry::new(9, None, "n")]);
        cache.fetch_from(&source, ModelFolder::Loras).unwrap();
        assert!(cache.fetch_from(&source, ModelFolder::Vae).is_err());

        let snap = cache.snapshot();
        assert!(snap.is_failed(ModelFolder::Vae));
        assert!(!snap.is_failed(ModelFolder::Loras));
        assert_eq!(snap.combo_values(ModelFolder::Vae), vec![LOAD_ERROR_PLACEHOLDER]);
        assert_eq!(snap.combo_values(ModelFolder::Loras), vec!["9:n"]);

        cache.publish(ModelFolder::Vae, Vec::new());
        assert_eq!(
            cache.snapshot().combo_values(ModelFolder::Vae),
            vec![NO_MODELS_PLACEHOLDER]
        );
    }

    struct LockedSource;

    impl CatalogSource for LockedSource {
        fn list_models(&self, _folder: ModelFolder) -> Result<Vec<CatalogEntry>, CatalogError> {
            Err(CatalogError::Auth("token expired".into()))
        }

        fn refresh(&self) -> Result<(), CatalogError> {
            Err(CatalogError::Auth("token expired".into()))
        }
    }

    #[test]
    fn auth_failure_disconnects() {
        let cache = CatalogCache::new();
        cache.publish(ModelFolder::Loras, vec![CatalogEntry::new(1, None, "a")]);
        assert!(matches!(
            cache.fetch_from(&LockedSource, ModelFolder::Loras),
            Err(CatalogError::Auth(_))
        ));
        let snap = cache.snapshot();
        assert!(!snap.is_connected());
        assert_eq!(snap.combo_values(ModelFolder::Loras), vec![NOT_CONNECTED_PLACEHOLDER]);
    }

    struct CountingSource {
        refreshes: std::cell::Cell<usize>,
        entries: Vec<CatalogEntry>,
    }

    impl CatalogSource for CountingSource {
        fn list_models(&self, _folder: ModelFolder) -> Result<Vec<CatalogEntry>, CatalogError> {
            Ok(self.entries.clone())
        }

        fn refresh(&self) -> Result<(), CatalogError> {
            self.refreshes.set(self.refreshes.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn refresh_from_asks_the_source_then_refetches() {
        let cache = CatalogCache::new();
        let source = CountingSource {
            refreshes: std::cell::Cell::new(0),
            entries: vec![CatalogEntry::new(5, Some(2), "fresh")],
        };
        cache.publish(ModelFolder::Vae, vec![CatalogEntry::new(1, None, "stale")]);
        let before = cache.version();

        assert_eq!(cache.refresh_from(&source, ModelFolder::Loras).ok(), Some(1));
        assert_eq!(source.refreshes.get(), 1);
        let snap = cache.snapshot();
        assert_eq!(snap.version(), before + 2);
        assert!(snap.entries(ModelFolder::Vae).is_empty());
        assert_eq!(snap.combo_values(ModelFolder::Loras), vec!["5@2:fresh"]);
    }

    #[test]
    fn refresh_from_stops_when_the_source_refuses() {
        let cache = CatalogCache::new();
        cache.publish(ModelFolder::Loras, vec![CatalogEntry::new(1, None, "a")]);
        assert!(cache.refresh_from(&LockedSource, ModelFolder::Loras).is_err());
        assert_eq!(cache.version(), 1);
        assert_eq!(cache.snapshot().entries(ModelFolder::Loras).len(), 1);
    }
}
