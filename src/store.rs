//! Typed state access with safe defaults.
//!
//! [`StateStore`] owns the [`ContainerRegistry`] and answers every read with a
//! value even when no record exists yet. Writes are crate-private and go
//! through [`crate::actions`] (transform and toggles) and
//! [`crate::lifecycle`] (record creation and disposal).
//!
//! [`FocusPointer`] remembers the container the user touched last. It only
//! routes keyboard input that arrives without a target; every other call
//! names its container explicitly.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use crate::config::PanelVisibilityScope;
use crate::host::NodeHandle;
use crate::registry::{ContainerKey, ContainerRegistry, ContainerState, ViewScope};
use crate::transform::Transform;

/// How panel visibility is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelPolicy {
    pub scope: PanelVisibilityScope,
    /// Shared flag under [`PanelVisibilityScope::Global`]; initial value for
    /// new records under [`PanelVisibilityScope::PerContainer`].
    pub global_visible: bool,
}

impl Default for PanelPolicy {
    fn default() -> Self {
        Self { scope: PanelVisibilityScope::PerContainer, global_visible: true }
    }
}

/// Read accessors over the registry; missing records read as defaults.
#[derive(Debug, Default)]
pub struct StateStore {
    registry: ContainerRegistry,
    panels: PanelPolicy,
}

impl StateStore {
    #[must_use]
    pub fn new(panels: PanelPolicy) -> Self {
        Self { registry: ContainerRegistry::new(), panels }
    }

    #[must_use]
    pub fn registry(&self) -> &ContainerRegistry {
        &self.registry
    }

    pub(crate) fn registry_mut(&mut self) -> &mut ContainerRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn panel_policy(&self) -> PanelPolicy {
        self.panels
    }

    pub(crate) fn set_panel_policy(&mut self, panels: PanelPolicy) {
        self.panels = panels;
    }

    /// The record for `key`, if one exists.
    #[must_use]
    pub fn get(&self, key: &ContainerKey) -> Option<&ContainerState> {
        self.registry.get(key)
    }

    /// Current transform, identity when unknown.
    #[must_use]
    pub fn transform(&self, key: &ContainerKey) -> Transform {
        self.registry.get(key).map_or(Transform::IDENTITY, |s| s.transform)
    }

    /// Whether touch gestures are left to the host. `true` when unknown.
    #[must_use]
    pub fn native_touch_events(&self, key: &ContainerKey) -> bool {
        self.registry.get(key).is_none_or(|s| s.native_touch_events)
    }

    /// Effective panel visibility under the configured scope.
    #[must_use]
    pub fn panels_visible(&self, key: &ContainerKey) -> bool {
        match self.panels.scope {
            PanelVisibilityScope::Global => self.panels.global_visible,
            PanelVisibilityScope::PerContainer => {
                self.registry.get(key).map_or(self.panels.global_visible, |s| s.panels_visible)
            }
        }
    }

    /// Fullscreen flag, `false` when unknown.
    #[must_use]
    pub fn fullscreen(&self, key: &ContainerKey) -> bool {
        self.registry.get(key).is_some_and(|s| s.fullscreen)
    }

    /// Source captured at creation, empty when unknown.
    #[must_use]
    pub fn cached_source(&self, key: &ContainerKey) -> &str {
        self.registry.get(key).map_or("", |s| s.cached_source.as_str())
    }

    pub(crate) fn state_mut(&mut self, key: &ContainerKey) -> &mut ContainerState {
        let visible = self.panels.global_visible;
        self.registry
            .get_or_create_with(key, || ContainerState { panels_visible: visible, ..ContainerState::default() })
            .0
    }
}

/// The container most recently touched by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusPointer {
    current: Option<(NodeHandle, ContainerKey)>,
}

impl FocusPointer {
    /// Point at `node`/`key`.
    pub fn touch(&mut self, node: NodeHandle, key: ContainerKey) {
        self.current = Some((node, key));
    }

    #[must_use]
    pub fn get(&self) -> Option<(NodeHandle, &ContainerKey)> {
        self.current.as_ref().map(|(node, key)| (*node, key))
    }

    /// Forget the focus if it points into `scope`.
    pub fn clear_scope(&mut self, scope: &ViewScope) {
        if self.current.as_ref().is_some_and(|(_, key)| &key.scope == scope) {
            self.current = None;
        }
    }

    /// Forget the focus if it points at `node`.
    pub fn clear_node(&mut self, node: NodeHandle) {
        if self.current.as_ref().is_some_and(|(n, _)| *n == node) {
            self.current = None;
        }
    }
}
