//! Engine: the components wired together behind the host entry points.
//!
//! [`EngineCore`] holds all state and turns host notifications and input
//! into [`Effect`]s. It only reads from the host, so it can be driven by a
//! fake host in tests. [`Engine`] owns a real host and presents the effects.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use serde::{Deserialize, Serialize};

use crate::actions::{self, RenderUpdate};
use crate::config::{PanelVisibilityScope, Settings};
use crate::export::{self, ExportError, ExportFormat, ExportRequest};
use crate::host::{DiagramKind, Host, NodeHandle, Presenter};
use crate::input::{InputEvent, Intent, Key, Modifiers, Pivot};
use crate::lifecycle::{LifecycleCoordinator, WatchChange};
use crate::registry::{ContainerKey, ViewScope};
use crate::router::{InputRouter, RouteContext};
use crate::store::{FocusPointer, PanelPolicy, StateStore};
use crate::transform::Transform;
use crate::viewport::{self, VisibleRegion};

/// Side effects returned from engine operations for the host to perform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Apply `css` as the diagram content's transform.
    Render { node: NodeHandle, transform: Transform, css: String, animate: bool },
    /// A diagram node was wrapped in a container; mount panels on it.
    /// `kind` tells the host which export buttons apply.
    ContainerWired { node: NodeHandle, key: ContainerKey, kind: DiagramKind },
    /// A container record was dropped after its last node went away.
    ContainerDisposed { key: ContainerKey },
    /// Every record of a view was dropped.
    ViewDisposed { scope: ViewScope },
    /// Start observing `root` for diagrams that render late.
    ObserveLateContent { scope: ViewScope, root: NodeHandle },
    /// Stop observing `root`.
    StopObserving { scope: ViewScope, root: NodeHandle },
    /// Set or clear the folded class on the container.
    SetFolded { node: NodeHandle, folded: bool },
    /// Show or hide the container's control panels.
    SetPanelsVisible { node: NodeHandle, visible: bool },
    /// Enter or leave fullscreen for the container.
    SetFullscreen { node: NodeHandle, fullscreen: bool },
    /// Let the host (true) or the engine (false) handle touch gestures.
    SetNativeTouch { node: NodeHandle, enabled: bool },
    /// Redraw the viewport indicator.
    ViewportIndicator { node: NodeHandle, region: VisibleRegion },
    /// Put text on the clipboard.
    CopyText { text: String },
    /// Write an exported artifact.
    Export { request: ExportRequest },
    /// Show a transient notice.
    Message { text: String },
}

/// Control-panel button presses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Move { dx: f64, dy: f64 },
    ZoomIn,
    ZoomOut,
    Reset,
    ToggleFold,
    TogglePanels,
    ToggleFullscreen,
    ToggleNativeTouch,
    CopySource,
    Export { format: ExportFormat },
}

/// Effects of one input event plus whether the DOM default should be suppressed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dispatch {
    pub effects: Vec<Effect>,
    pub prevent_default: bool,
}

fn render(node: NodeHandle, update: RenderUpdate) -> Effect {
    Effect::Render { node, transform: update.transform, css: update.transform.css(), animate: update.animate }
}

/// Core engine state. All logic that doesn't need to present anything.
#[derive(Debug)]
pub struct EngineCore {
    pub settings: Settings,
    pub store: StateStore,
    pub router: InputRouter,
    pub lifecycle: LifecycleCoordinator,
    pub focus: FocusPointer,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let panels = PanelPolicy { scope: settings.panel_scope, global_visible: settings.panels_visible_by_default };
        Self {
            settings,
            store: StateStore::new(panels),
            router: InputRouter::new(),
            lifecycle: LifecycleCoordinator::new(),
            focus: FocusPointer::default(),
        }
    }

    // --- Settings ---

    /// Replace the settings snapshot. A changed panel scope re-publishes
    /// visibility for every wired node.
    pub fn update_settings(&mut self, settings: Settings) -> Vec<Effect> {
        let scope_changed = settings.panel_scope != self.settings.panel_scope;
        if scope_changed {
            let global_visible = match settings.panel_scope {
                PanelVisibilityScope::Global => settings.panels_visible_by_default,
                PanelVisibilityScope::PerContainer => self.store.panel_policy().global_visible,
            };
            self.store.set_panel_policy(PanelPolicy { scope: settings.panel_scope, global_visible });
        }
        self.settings = settings;
        if !scope_changed {
            return Vec::new();
        }
        self.lifecycle
            .wired_nodes()
            .into_iter()
            .map(|(node, key)| Effect::SetPanelsVisible { node, visible: self.store.panels_visible(&key) })
            .collect()
    }

    // --- Host lifecycle ---

    /// The host rendered or re-rendered content under `root`.
    pub fn content_changed<H: Host>(&mut self, host: &H, scope: &ViewScope, root: NodeHandle, now_ms: f64) -> Vec<Effect> {
        let scan = self.lifecycle.content_changed(
            host,
            &mut self.store,
            &mut self.router,
            &self.settings,
            scope,
            root,
            now_ms,
        );

        let mut effects = Vec::new();
        for wired in scan.wired {
            effects.push(Effect::ContainerWired { node: wired.node, key: wired.key.clone(), kind: wired.kind });
            effects.push(render(wired.node, RenderUpdate { transform: wired.transform, animate: false }));
            effects.push(Effect::SetPanelsVisible { node: wired.node, visible: self.store.panels_visible(&wired.key) });
            if wired.created && self.settings.fold_on_wire {
                effects.push(Effect::SetFolded { node: wired.node, folded: true });
            }
        }
        match scan.watch {
            WatchChange::Started => effects.push(Effect::ObserveLateContent { scope: scope.clone(), root }),
            WatchChange::Ended => effects.push(Effect::StopObserving { scope: scope.clone(), root }),
            WatchChange::Unchanged => {}
        }
        effects
    }

    /// The host removed `nodes` from `scope`. Nodes wired in another view are kept.
    pub fn nodes_removed(&mut self, scope: &ViewScope, nodes: &[NodeHandle]) -> Vec<Effect> {
        for node in nodes {
            if self.lifecycle.key_of(*node).is_some_and(|key| &key.scope == scope) {
                self.focus.clear_node(*node);
            }
        }
        self.lifecycle
            .nodes_removed(&mut self.store, &mut self.router, scope, nodes)
            .into_iter()
            .map(|key| Effect::ContainerDisposed { key })
            .collect()
    }

    /// The host closed `scope`.
    pub fn view_closed(&mut self, scope: &ViewScope) -> Vec<Effect> {
        self.focus.clear_scope(scope);
        self.lifecycle.view_closed(&mut self.store, &mut self.router, scope);
        vec![Effect::ViewDisposed { scope: scope.clone() }]
    }

    /// Close every scope the host no longer knows about.
    pub fn sweep_views<H: Host>(&mut self, host: &H) -> Vec<Effect> {
        let closed = self.lifecycle.sweep(host, &mut self.store, &mut self.router);
        closed
            .into_iter()
            .map(|scope| {
                self.focus.clear_scope(&scope);
                Effect::ViewDisposed { scope }
            })
            .collect()
    }

    /// Advance timers: expire late-content watches.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Effect> {
        self.lifecycle
            .expire_watches(now_ms)
            .into_iter()
            .map(|(scope, root)| Effect::StopObserving { scope, root })
            .collect()
    }

    // --- Input ---

    /// Route one input event received on `node`.
    pub fn handle_input<H: Host>(&mut self, host: &H, node: NodeHandle, event: &InputEvent, now_ms: f64) -> Dispatch {
        let Some(key) = self.lifecycle.key_of(node).cloned() else {
            return Dispatch::default();
        };
        let ctx = RouteContext {
            current: self.store.transform(&key),
            native_touch_events: self.store.native_touch_events(&key),
            folded: host.is_folded(node),
        };
        let routed = self.router.route(node, ctx, event, &self.settings, now_ms);
        if routed.focus {
            self.focus.touch(node, key.clone());
        }

        let mut effects = Vec::new();
        if let Some(intent) = routed.intent {
            effects.push(self.apply_intent(host, node, &key, intent));
        }
        if routed.refresh_indicator {
            if let Some(measurements) = host.measure(node) {
                let region = viewport::visible_region(self.store.transform(&key), measurements);
                effects.push(Effect::ViewportIndicator { node, region });
            }
        }
        Dispatch { effects, prevent_default: routed.prevent_default }
    }

    /// Keyboard input without a target node goes to the focused container,
    /// provided it lives in the active view.
    pub fn key_down<H: Host>(&mut self, host: &H, key: Key, modifiers: Modifiers, now_ms: f64) -> Dispatch {
        let Some((node, focused)) = self.focus.get().map(|(node, key)| (node, key.clone())) else {
            return Dispatch::default();
        };
        if host.active_view_scope().as_ref() != Some(&focused.scope) {
            return Dispatch::default();
        }
        self.handle_input(host, node, &InputEvent::KeyDown { key, modifiers }, now_ms)
    }

    fn apply_intent<H: Host>(&mut self, host: &H, node: NodeHandle, key: &ContainerKey, intent: Intent) -> Effect {
        let needs_measure = matches!(intent, Intent::Reset { .. } | Intent::ZoomAt { pivot: Pivot::Center, .. });
        let measurements = if needs_measure { host.measure(node) } else { None };
        let update = actions::apply(&mut self.store, key, intent, measurements, self.settings.max_step_scale);
        if !matches!(intent, Intent::PanFrom { .. }) {
            for wired in self.lifecycle.nodes_of(key) {
                self.router.rebase(wired, update.transform);
            }
        }
        render(node, update)
    }

    // --- Panel commands ---

    /// Execute a control-panel command on `node`.
    pub fn command<H: Host>(&mut self, host: &H, node: NodeHandle, command: Command, now_ms: f64) -> Vec<Effect> {
        let Some(key) = self.lifecycle.key_of(node).cloned() else {
            return Vec::new();
        };
        self.focus.touch(node, key.clone());
        let zoom = |factor| Intent::ZoomAt { factor, pivot: Pivot::Center, discrete: true, animate: true };

        match command {
            Command::Move { dx, dy } => {
                vec![self.apply_intent(host, node, &key, Intent::MoveBy { dx, dy, animate: true })]
            }
            Command::ZoomIn => vec![self.apply_intent(host, node, &key, zoom(self.settings.zoom_in_factor))],
            Command::ZoomOut => vec![self.apply_intent(host, node, &key, zoom(self.settings.zoom_out_factor))],
            Command::Reset => vec![self.apply_intent(host, node, &key, Intent::Reset { animate: true })],
            Command::ToggleFold => vec![Effect::SetFolded { node, folded: !host.is_folded(node) }],
            Command::TogglePanels => {
                let visible = actions::toggle_panels(&mut self.store, &key);
                let nodes = match self.store.panel_policy().scope {
                    PanelVisibilityScope::Global => {
                        self.lifecycle.wired_nodes().into_iter().map(|(node, _)| node).collect()
                    }
                    PanelVisibilityScope::PerContainer => self.lifecycle.nodes_of(&key),
                };
                nodes.into_iter().map(|node| Effect::SetPanelsVisible { node, visible }).collect()
            }
            Command::ToggleFullscreen => {
                let fullscreen = actions::toggle_fullscreen(&mut self.store, &key);
                vec![Effect::SetFullscreen { node, fullscreen }]
            }
            Command::ToggleNativeTouch => {
                let enabled = actions::toggle_native_touch(&mut self.store, &key);
                let text = if enabled { "Native touch gestures enabled" } else { "Native touch gestures disabled" };
                vec![Effect::SetNativeTouch { node, enabled }, Effect::Message { text: text.to_owned() }]
            }
            Command::CopySource => {
                let source = self.store.cached_source(&key);
                if source.is_empty() {
                    vec![Effect::Message { text: "Nothing to copy".to_owned() }]
                } else {
                    vec![Effect::CopyText { text: source.to_owned() }]
                }
            }
            Command::Export { format } => vec![self.export(host, node, &key, format, now_ms)],
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn export<H: Host>(&self, host: &H, node: NodeHandle, key: &ContainerKey, format: ExportFormat, now_ms: f64) -> Effect {
        let document = host.document_name(&key.scope).unwrap_or_default();
        let timestamp = now_ms.max(0.0).round() as u64;
        let file_name = export::export_file_name(&self.settings.export_prefix, &document, key.id, timestamp, format);
        let kind = self.lifecycle.kind_of(node).unwrap_or_default();
        let svg_document = match (format, kind) {
            (ExportFormat::Png, DiagramKind::Image) => None,
            (ExportFormat::Png, DiagramKind::Svg) => return Effect::Message { text: ExportError::NoImage.to_string() },
            (ExportFormat::Svg, DiagramKind::Image) => return Effect::Message { text: ExportError::NoSvg.to_string() },
            (ExportFormat::Svg, DiagramKind::Svg) => {
                match export::svg_document(&host.svg_markup(node).unwrap_or_default()) {
                    Ok(doc) => Some(doc),
                    Err(err) => return Effect::Message { text: err.to_string() },
                }
            }
        };
        Effect::Export { request: ExportRequest { node, format, file_name, svg_document } }
    }

    // --- Queries ---

    /// Current transform of the container wired to `node`.
    #[must_use]
    pub fn transform_of(&self, node: NodeHandle) -> Option<Transform> {
        self.lifecycle.key_of(node).map(|key| self.store.transform(key))
    }
}

/// The full engine: [`EngineCore`] plus the host that presents its effects.
pub struct Engine<H> {
    host: H,
    pub core: EngineCore,
}

impl<H: Host + Presenter> Engine<H> {
    #[must_use]
    pub fn new(host: H, settings: Settings) -> Self {
        Self { host, core: EngineCore::new(settings) }
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn update_settings(&mut self, settings: Settings) {
        let effects = self.core.update_settings(settings);
        self.present(effects);
    }

    pub fn content_changed(&mut self, scope: &ViewScope, root: NodeHandle, now_ms: f64) {
        let effects = self.core.content_changed(&self.host, scope, root, now_ms);
        self.present(effects);
    }

    pub fn nodes_removed(&mut self, scope: &ViewScope, nodes: &[NodeHandle]) {
        let effects = self.core.nodes_removed(scope, nodes);
        self.present(effects);
    }

    pub fn view_closed(&mut self, scope: &ViewScope) {
        let effects = self.core.view_closed(scope);
        self.present(effects);
    }

    pub fn sweep_views(&mut self) {
        let effects = self.core.sweep_views(&self.host);
        self.present(effects);
    }

    pub fn tick(&mut self, now_ms: f64) {
        let effects = self.core.tick(now_ms);
        self.present(effects);
    }

    /// Route an input event. Returns whether the DOM default should be suppressed.
    pub fn handle_input(&mut self, node: NodeHandle, event: &InputEvent, now_ms: f64) -> bool {
        let dispatch = self.core.handle_input(&self.host, node, event, now_ms);
        self.present(dispatch.effects);
        dispatch.prevent_default
    }

    /// Route an untargeted key press. Returns whether the DOM default should be suppressed.
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers, now_ms: f64) -> bool {
        let dispatch = self.core.key_down(&self.host, key, modifiers, now_ms);
        self.present(dispatch.effects);
        dispatch.prevent_default
    }

    /// Execute a panel command. Fullscreen changes refit once the host has
    /// applied the new layout.
    pub fn command(&mut self, node: NodeHandle, command: Command, now_ms: f64) {
        let effects = self.core.command(&self.host, node, command, now_ms);
        self.present(effects);
        if command == Command::ToggleFullscreen {
            let effects = self.core.command(&self.host, node, Command::Reset, now_ms);
            self.present(effects);
        }
    }

    fn present(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Render { node, css, animate, .. } => self.host.render_transform(node, &css, animate),
                Effect::Message { text } => self.host.show_transient_message(&text),
                Effect::CopyText { text } => match self.host.write_clipboard(&text) {
                    Ok(()) => self.host.show_transient_message("Copied"),
                    Err(err) => {
                        tracing::warn!(error = %err, "clipboard write failed");
                        self.host.show_transient_message(&format!("Copy failed: {err}"));
                    }
                },
                Effect::Export { request } => match self.host.save_export(&request) {
                    Ok(()) => self.host.show_transient_message(&format!("Saved {}", request.file_name)),
                    Err(err) => {
                        tracing::warn!(error = %err, file = %request.file_name, "export failed");
                        self.host.show_transient_message(&err.to_string());
                    }
                },
                other => self.host.apply(&other),
            }
        }
    }
}
