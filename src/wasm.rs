//! Browser bridge.
//!
//! [`DiagramZoom`] is the object the host plugin instantiates. Host queries and
//! presentation go through a plain JS callbacks object; structured values
//! cross the boundary as JSON.
//!
//! Expected callbacks:
//!
//! | Callback | Returns |
//! |----------|---------|
//! | `activeViewScope()` | `string \| null` |
//! | `isViewOpen(scope)` | `boolean` |
//! | `findDiagrams(scope, root)` | `[{ node, anchor?, kind? }]` |
//! | `sourceSlice(scope, node)` | `string \| null` |
//! | `measure(node)` | `{ container, content } \| null` |
//! | `isFolded(node)` | `boolean` |
//! | `svgMarkup(node)` | `string \| null` |
//! | `documentName(scope)` | `string \| null` |
//! | `renderTransform(node, css, animate)` | |
//! | `showMessage(text)` | |
//! | `writeClipboard(text)` | throws on failure |
//! | `saveExport(request)` | throws on failure |
//! | `applyEffect(effect)` | |

use js_sys::{Function, JSON, Reflect};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::config::Settings;
use crate::engine::{Command, Effect, Engine};
use crate::export::{ExportError, ExportRequest};
use crate::host::{DiagramNode, Host, Measurements, NodeHandle, Presenter};
use crate::input::{InputEvent, Key, Modifiers};
use crate::registry::ViewScope;

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// [`Host`] and [`Presenter`] backed by a JS callbacks object.
struct JsHost {
    callbacks: JsValue,
}

impl JsHost {
    fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
        let function: Function = Reflect::get(&self.callbacks, &JsValue::from_str(name))?
            .dyn_into()
            .map_err(|_| JsValue::from_str(&format!("callback `{name}` is not a function")))?;
        match args {
            [] => function.call0(&self.callbacks),
            [a] => function.call1(&self.callbacks, a),
            [a, b] => function.call2(&self.callbacks, a, b),
            [a, b, c, ..] => function.call3(&self.callbacks, a, b, c),
        }
    }

    /// Call a query callback. Failures are logged and read as `None`.
    fn query(&self, name: &str, args: &[JsValue]) -> Option<JsValue> {
        match self.call(name, args) {
            Ok(value) if value.is_null() || value.is_undefined() => None,
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(callback = name, error = %describe(&err), "host callback failed");
                None
            }
        }
    }

    fn query_string(&self, name: &str, args: &[JsValue]) -> Option<String> {
        self.query(name, args).and_then(|value| value.as_string())
    }

    fn query_bool(&self, name: &str, args: &[JsValue]) -> bool {
        self.query(name, args).and_then(|value| value.as_bool()).unwrap_or_default()
    }

    fn query_json<T: DeserializeOwned>(&self, name: &str, args: &[JsValue]) -> Option<T> {
        let value = self.query(name, args)?;
        let raw: String = match JSON::stringify(&value) {
            Ok(raw) => raw.into(),
            Err(err) => {
                tracing::warn!(callback = name, error = %describe(&err), "host value not serializable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(callback = name, error = %err, "malformed host value");
                None
            }
        }
    }

    /// Call a presentation callback whose result is ignored.
    fn notify(&self, name: &str, args: &[JsValue]) {
        if let Err(err) = self.call(name, args) {
            tracing::warn!(callback = name, error = %describe(&err), "host callback failed");
        }
    }

    fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, String> {
        let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
        JSON::parse(&raw).map_err(|e| describe(&e))
    }
}

fn scope_arg(scope: &ViewScope) -> JsValue {
    JsValue::from_str(&scope.0)
}

fn node_arg(node: NodeHandle) -> JsValue {
    JsValue::from(node.0)
}

impl Host for JsHost {
    fn active_view_scope(&self) -> Option<ViewScope> {
        self.query_string("activeViewScope", &[]).map(ViewScope)
    }

    fn is_view_open(&self, scope: &ViewScope) -> bool {
        self.query_bool("isViewOpen", &[scope_arg(scope)])
    }

    fn find_diagrams(&self, scope: &ViewScope, root: NodeHandle) -> Vec<DiagramNode> {
        self.query_json("findDiagrams", &[scope_arg(scope), node_arg(root)]).unwrap_or_default()
    }

    fn source_slice(&self, scope: &ViewScope, node: NodeHandle) -> Option<String> {
        self.query_string("sourceSlice", &[scope_arg(scope), node_arg(node)])
    }

    fn measure(&self, node: NodeHandle) -> Option<Measurements> {
        self.query_json("measure", &[node_arg(node)])
    }

    fn is_folded(&self, node: NodeHandle) -> bool {
        self.query_bool("isFolded", &[node_arg(node)])
    }

    fn svg_markup(&self, node: NodeHandle) -> Option<String> {
        self.query_string("svgMarkup", &[node_arg(node)])
    }

    fn document_name(&self, scope: &ViewScope) -> Option<String> {
        self.query_string("documentName", &[scope_arg(scope)])
    }
}

impl Presenter for JsHost {
    fn render_transform(&mut self, node: NodeHandle, css: &str, animate: bool) {
        self.notify("renderTransform", &[node_arg(node), JsValue::from_str(css), JsValue::from_bool(animate)]);
    }

    fn show_transient_message(&mut self, text: &str) {
        self.notify("showMessage", &[JsValue::from_str(text)]);
    }

    fn write_clipboard(&mut self, text: &str) -> Result<(), ExportError> {
        self.call("writeClipboard", &[JsValue::from_str(text)])
            .map(|_| ())
            .map_err(|err| ExportError::Clipboard(describe(&err)))
    }

    fn save_export(&mut self, request: &ExportRequest) -> Result<(), ExportError> {
        let arg = Self::to_js(request).map_err(ExportError::Write)?;
        self.call("saveExport", &[arg]).map(|_| ()).map_err(|err| ExportError::Write(describe(&err)))
    }

    fn apply(&mut self, effect: &Effect) {
        match Self::to_js(effect) {
            Ok(arg) => self.notify("applyEffect", &[arg]),
            Err(err) => tracing::warn!(error = %err, "effect not serializable"),
        }
    }
}

fn parse<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T, JsError> {
    serde_json::from_str(raw).map_err(|e| JsError::new(&format!("invalid {what}: {e}")))
}

/// Engine handle exposed to the host plugin.
#[wasm_bindgen]
pub struct DiagramZoom {
    engine: Engine<JsHost>,
}

#[wasm_bindgen]
impl DiagramZoom {
    /// Create an engine. `settings` is a JSON settings snapshot; an empty
    /// string selects the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(callbacks: JsValue, settings: &str) -> Result<DiagramZoom, JsError> {
        let settings = if settings.trim().is_empty() {
            Settings::default()
        } else {
            Settings::from_json(settings).map_err(|e| JsError::new(&e.to_string()))?
        };
        tracing::info!(panel_scope = ?settings.panel_scope, "diagram zoom engine created");
        Ok(Self { engine: Engine::new(JsHost { callbacks }, settings) })
    }

    #[wasm_bindgen(js_name = "updateSettings")]
    pub fn update_settings(&mut self, settings: &str) -> Result<(), JsError> {
        let settings = Settings::from_json(settings).map_err(|e| JsError::new(&e.to_string()))?;
        self.engine.update_settings(settings);
        Ok(())
    }

    #[wasm_bindgen(js_name = "contentChanged")]
    pub fn content_changed(&mut self, scope: &str, root: u32, now_ms: f64) {
        self.engine.content_changed(&ViewScope::new(scope), NodeHandle(root), now_ms);
    }

    #[wasm_bindgen(js_name = "nodesRemoved")]
    pub fn nodes_removed(&mut self, scope: &str, nodes: Vec<u32>) {
        let nodes: Vec<NodeHandle> = nodes.into_iter().map(NodeHandle).collect();
        self.engine.nodes_removed(&ViewScope::new(scope), &nodes);
    }

    #[wasm_bindgen(js_name = "viewClosed")]
    pub fn view_closed(&mut self, scope: &str) {
        self.engine.view_closed(&ViewScope::new(scope));
    }

    #[wasm_bindgen(js_name = "sweepViews")]
    pub fn sweep_views(&mut self) {
        self.engine.sweep_views();
    }

    pub fn tick(&mut self, now_ms: f64) {
        self.engine.tick(now_ms);
    }

    /// Route a JSON input event. Returns whether to call `preventDefault`.
    #[wasm_bindgen(js_name = "handleInput")]
    pub fn handle_input(&mut self, node: u32, event: &str, now_ms: f64) -> Result<bool, JsError> {
        let event: InputEvent = parse(event, "input event")?;
        Ok(self.engine.handle_input(NodeHandle(node), &event, now_ms))
    }

    /// Route a document-level key press. Returns whether to call `preventDefault`.
    #[wasm_bindgen(js_name = "keyDown")]
    #[allow(clippy::fn_params_excessive_bools)]
    pub fn key_down(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool, now_ms: f64) -> bool {
        self.engine.key_down(Key::new(key), Modifiers { shift, ctrl, alt, meta }, now_ms)
    }

    /// Run a JSON panel command such as `{"type":"zoom_in"}`.
    pub fn command(&mut self, node: u32, command: &str, now_ms: f64) -> Result<(), JsError> {
        let command: Command = parse(command, "command")?;
        self.engine.command(NodeHandle(node), command, now_ms);
        Ok(())
    }

    /// CSS transform currently applied to `node`, if it is wired.
    #[wasm_bindgen(js_name = "transformCss")]
    pub fn transform_css(&self, node: u32) -> Option<String> {
        self.engine.core.transform_of(NodeHandle(node)).map(|t| t.css())
    }
}
