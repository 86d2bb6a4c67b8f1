//! Lifecycle coordinator: wiring containers as the host's DOM changes.
//!
//! DESIGN
//! ======
//! The host reports three things: content appeared under a root node, nodes
//! were removed, a view closed. The coordinator keeps a table from live node
//! handles to container keys, creates registry records and router machines
//! for new diagram nodes, and tears both down again.
//!
//! A remount of the same logical diagram (same source anchor) produces a new
//! node handle but the same key, so its transform survives. A record is only
//! disposed once no live node maps to its key; the host may report the new
//! node before it reports the old one gone.
//!
//! Roots that contain no diagram yet are watched for late rendering until a
//! deadline passes, so the host never keeps an observer running forever.

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_test;

use std::collections::{BTreeSet, HashMap};

use crate::actions;
use crate::config::Settings;
use crate::host::{DiagramKind, Host, NodeHandle};
use crate::registry::{ContainerId, ContainerKey, ContainerState, ViewScope};
use crate::router::InputRouter;
use crate::store::StateStore;
use crate::transform::Transform;

/// One diagram node wired by a content scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Wired {
    pub node: NodeHandle,
    pub key: ContainerKey,
    pub kind: DiagramKind,
    /// `false` when an existing record was reused (remount).
    pub created: bool,
    /// Transform to render right away.
    pub transform: Transform,
}

/// What happened to the late-content watch of a scanned root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchChange {
    #[default]
    Unchanged,
    /// The root had no diagrams; the host should observe it.
    Started,
    /// Diagrams appeared; the host can stop observing.
    Ended,
}

/// Result of one content scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentScan {
    pub wired: Vec<Wired>,
    pub watch: WatchChange,
}

/// A live node's container and what its diagram is made of.
#[derive(Debug, Clone, PartialEq)]
struct Wiring {
    key: ContainerKey,
    kind: DiagramKind,
}

/// Tracks live node wiring and pending late-content watches.
#[derive(Debug, Default)]
pub struct LifecycleCoordinator {
    wired: HashMap<NodeHandle, Wiring>,
    watches: HashMap<(ViewScope, NodeHandle), f64>,
}

impl LifecycleCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the container wired to `node`.
    #[must_use]
    pub fn key_of(&self, node: NodeHandle) -> Option<&ContainerKey> {
        self.wired.get(&node).map(|w| &w.key)
    }

    /// Diagram kind reported when `node` was wired.
    #[must_use]
    pub fn kind_of(&self, node: NodeHandle) -> Option<DiagramKind> {
        self.wired.get(&node).map(|w| w.kind)
    }

    /// Live nodes currently mapped to `key`, sorted.
    #[must_use]
    pub fn nodes_of(&self, key: &ContainerKey) -> Vec<NodeHandle> {
        let mut nodes: Vec<NodeHandle> =
            self.wired.iter().filter(|(_, w)| &w.key == key).map(|(node, _)| *node).collect();
        nodes.sort();
        nodes
    }

    /// Every wired node with its key, sorted by node.
    #[must_use]
    pub fn wired_nodes(&self) -> Vec<(NodeHandle, ContainerKey)> {
        let mut all: Vec<(NodeHandle, ContainerKey)> =
            self.wired.iter().map(|(node, w)| (*node, w.key.clone())).collect();
        all.sort_by_key(|(node, _)| *node);
        all
    }

    /// Whether `root` in `scope` is being watched for late content.
    #[must_use]
    pub fn is_watching(&self, scope: &ViewScope, root: NodeHandle) -> bool {
        self.watches.contains_key(&(scope.clone(), root))
    }

    /// Scan `root` for unwired diagrams and wire them.
    #[allow(clippy::too_many_arguments)]
    pub fn content_changed<H: Host>(
        &mut self,
        host: &H,
        store: &mut StateStore,
        router: &mut InputRouter,
        settings: &Settings,
        scope: &ViewScope,
        root: NodeHandle,
        now_ms: f64,
    ) -> ContentScan {
        let diagrams = host.find_diagrams(scope, root);
        let mut scan = ContentScan::default();

        for diagram in &diagrams {
            if self.wired.contains_key(&diagram.node) {
                continue;
            }
            let key = ContainerKey::new(scope.clone(), ContainerId::mint(diagram.anchor.as_ref()));
            let panels_visible = store.panel_policy().global_visible;
            let (_, created) = store.registry_mut().get_or_create_with(&key, || ContainerState {
                cached_source: host.source_slice(scope, diagram.node).unwrap_or_default(),
                anchor: diagram.anchor.clone(),
                panels_visible,
                ..ContainerState::default()
            });
            let transform = if created && settings.fit_on_wire {
                actions::reset_to_fit(store, &key, host.measure(diagram.node), false).transform
            } else {
                store.transform(&key)
            };

            router.attach(diagram.node, settings.indicator_throttle_ms);
            self.wired.insert(diagram.node, Wiring { key: key.clone(), kind: diagram.kind });
            tracing::debug!(%key, node = %diagram.node, created, "container wired");
            scan.wired.push(Wired { node: diagram.node, key, kind: diagram.kind, created, transform });
        }

        let watch_key = (scope.clone(), root);
        if diagrams.is_empty() {
            if !self.watches.contains_key(&watch_key) {
                let deadline = now_ms + settings.late_content_timeout_ms;
                tracing::trace!(%scope, %root, deadline, "watching for late content");
                self.watches.insert(watch_key, deadline);
                scan.watch = WatchChange::Started;
            }
        } else if self.watches.remove(&watch_key).is_some() {
            scan.watch = WatchChange::Ended;
        }
        scan
    }

    /// Drop watches whose deadline has passed. Returns the expired roots.
    pub fn expire_watches(&mut self, now_ms: f64) -> Vec<(ViewScope, NodeHandle)> {
        let mut expired: Vec<(ViewScope, NodeHandle)> = self
            .watches
            .iter()
            .filter(|(_, deadline)| **deadline <= now_ms)
            .map(|(watch, _)| watch.clone())
            .collect();
        expired.sort();
        for watch in &expired {
            self.watches.remove(watch);
            tracing::debug!(scope = %watch.0, root = %watch.1, "late content watch expired");
        }
        expired
    }

    /// Unwire removed nodes of `scope`. Nodes wired under another scope are
    /// left alone. Returns the keys whose records were disposed.
    pub fn nodes_removed(
        &mut self,
        store: &mut StateStore,
        router: &mut InputRouter,
        scope: &ViewScope,
        nodes: &[NodeHandle],
    ) -> Vec<ContainerKey> {
        let mut disposed = Vec::new();
        for node in nodes {
            self.watches.remove(&(scope.clone(), *node));
            if let Some(owner) = self.wired.get(node).map(|w| &w.key.scope).filter(|owner| *owner != scope) {
                tracing::debug!(%node, %scope, %owner, "removal ignored, node wired in another view");
                continue;
            }
            router.detach(*node);
            let Some(Wiring { key, .. }) = self.wired.remove(node) else {
                continue;
            };
            if self.wired.values().any(|w| w.key == key) {
                tracing::debug!(%key, %node, "node removed, container still mounted elsewhere");
                continue;
            }
            if store.registry_mut().dispose_container(&key).is_some() {
                tracing::debug!(%key, %node, "container disposed");
                disposed.push(key);
            }
        }
        disposed
    }

    /// Tear down everything under `scope`. Returns the number of records dropped.
    pub fn view_closed(&mut self, store: &mut StateStore, router: &mut InputRouter, scope: &ViewScope) -> usize {
        let nodes: Vec<NodeHandle> =
            self.wired.iter().filter(|(_, w)| &w.key.scope == scope).map(|(node, _)| *node).collect();
        for node in &nodes {
            router.detach(*node);
            self.wired.remove(node);
        }
        self.watches.retain(|(watched, _), _| watched != scope);
        let dropped = store.registry_mut().dispose_view(scope);
        tracing::info!(%scope, nodes = nodes.len(), records = dropped, "view closed");
        dropped
    }

    /// Close every known scope the host no longer reports as open.
    pub fn sweep<H: Host>(&mut self, host: &H, store: &mut StateStore, router: &mut InputRouter) -> Vec<ViewScope> {
        let mut known: BTreeSet<ViewScope> = store.registry().scopes().into_iter().collect();
        known.extend(self.wired.values().map(|w| w.key.scope.clone()));
        known.extend(self.watches.keys().map(|(scope, _)| scope.clone()));

        let closed: Vec<ViewScope> = known.into_iter().filter(|scope| !host.is_view_open(scope)).collect();
        for scope in &closed {
            self.view_closed(store, router, scope);
        }
        closed
    }
}
