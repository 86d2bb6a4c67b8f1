//! Container registry: per-view, per-container interaction state.
//!
//! State is addressed by [`ContainerKey`] (view scope + container id), never
//! by a node reference, so it survives the host tearing down and rebuilding
//! diagram nodes. The registry is a two-level map: dropping a view drops every
//! container under it in one step, while node removal disposes single
//! containers.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transform::Transform;

/// Host-managed identifier of one open view/pane.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewScope(pub String);

impl ViewScope {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ViewScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a diagram's definition lives in its source document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceAnchor {
    /// Path of the document inside the host's vault/workspace.
    pub path: String,
    /// First line of the diagram's definition block.
    pub line: u32,
    /// Index of the diagram among those starting on the same line.
    #[serde(default)]
    pub ordinal: u32,
}

/// Stable identifier of one logical diagram container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub Uuid);

impl ContainerId {
    /// Deterministic id for a diagram at `anchor`. Remounts of the same
    /// diagram map to the same id.
    #[must_use]
    pub fn from_anchor(anchor: &SourceAnchor) -> Self {
        let name = format!("diagram-zoom:{}#{}:{}", anchor.path, anchor.line, anchor.ordinal);
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()))
    }

    /// Fresh random id for a diagram with no known source position.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Mint an id: anchored when the position is known, random otherwise.
    #[must_use]
    pub fn mint(anchor: Option<&SourceAnchor>) -> Self {
        anchor.map_or_else(Self::random, Self::from_anchor)
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Full address of a container's state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerKey {
    pub scope: ViewScope,
    pub id: ContainerId,
}

impl ContainerKey {
    #[must_use]
    pub fn new(scope: ViewScope, id: ContainerId) -> Self {
        Self { scope, id }
    }
}

impl fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.id)
    }
}

/// Mutable state record for one container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerState {
    /// Current pan/zoom.
    pub transform: Transform,
    /// When true, touch gestures are left to the host (native scrolling).
    pub native_touch_events: bool,
    /// Control panel visibility, used under per-container panel scope.
    pub panels_visible: bool,
    /// Session-only fullscreen flag.
    pub fullscreen: bool,
    /// Diagram definition captured when the record was created.
    pub cached_source: String,
    /// Source position the id was minted from, if any.
    pub anchor: Option<SourceAnchor>,
}

impl Default for ContainerState {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            native_touch_events: true,
            panels_visible: true,
            fullscreen: false,
            cached_source: String::new(),
            anchor: None,
        }
    }
}

/// Two-level map `ViewScope -> ContainerId -> ContainerState`.
#[derive(Debug, Default)]
pub struct ContainerRegistry {
    views: HashMap<ViewScope, HashMap<ContainerId, ContainerState>>,
}

impl ContainerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the record for `key`, creating a default one if absent.
    pub fn get_or_create(&mut self, key: &ContainerKey) -> &mut ContainerState {
        self.get_or_create_with(key, ContainerState::default).0
    }

    /// Return the record for `key`, creating it with `init` if absent.
    ///
    /// The flag is `true` when the record was created by this call.
    pub fn get_or_create_with<F>(&mut self, key: &ContainerKey, init: F) -> (&mut ContainerState, bool)
    where
        F: FnOnce() -> ContainerState,
    {
        let containers = self.views.entry(key.scope.clone()).or_default();
        let mut created = false;
        let state = containers.entry(key.id).or_insert_with(|| {
            created = true;
            init()
        });
        (state, created)
    }

    #[must_use]
    pub fn get(&self, key: &ContainerKey) -> Option<&ContainerState> {
        self.views.get(&key.scope)?.get(&key.id)
    }

    pub fn get_mut(&mut self, key: &ContainerKey) -> Option<&mut ContainerState> {
        self.views.get_mut(&key.scope)?.get_mut(&key.id)
    }

    #[must_use]
    pub fn contains(&self, key: &ContainerKey) -> bool {
        self.get(key).is_some()
    }

    /// Drop every container under `scope`. Returns how many records were removed.
    pub fn dispose_view(&mut self, scope: &ViewScope) -> usize {
        self.views.remove(scope).map_or(0, |containers| containers.len())
    }

    /// Drop a single container record, returning it if it was present.
    ///
    /// The scope entry stays even when it becomes empty; it goes away with
    /// [`Self::dispose_view`].
    pub fn dispose_container(&mut self, key: &ContainerKey) -> Option<ContainerState> {
        self.views.get_mut(&key.scope)?.remove(&key.id)
    }

    /// Scopes that currently have an entry, sorted for stable iteration.
    #[must_use]
    pub fn scopes(&self) -> Vec<ViewScope> {
        let mut scopes: Vec<ViewScope> = self.views.keys().cloned().collect();
        scopes.sort();
        scopes
    }

    /// Container ids registered under `scope`, sorted.
    #[must_use]
    pub fn container_ids(&self, scope: &ViewScope) -> Vec<ContainerId> {
        let mut ids: Vec<ContainerId> = self
            .views
            .get(scope)
            .map(|containers| containers.keys().copied().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// Total number of container records across all scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.values().map(HashMap::len).sum()
    }

    /// Returns `true` if no container record exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
