//! Host collaborator contracts.
//!
//! The engine never touches the DOM. Everything it needs from the host
//! application goes through [`Host`] (read-only queries) and everything it
//! asks the host to show goes through [`Presenter`].

#[cfg(test)]
#[path = "host_test.rs"]
pub(crate) mod host_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::Effect;
use crate::export::{ExportError, ExportRequest};
use crate::registry::{SourceAnchor, ViewScope};
use crate::transform::Size;

/// Host-assigned handle of one live node. Ephemeral: a rebuilt node gets a new handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeHandle(pub u32);

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the rendered diagram is made of; decides which export formats exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramKind {
    /// Inline SVG markup.
    #[default]
    Svg,
    /// A raster `<img>`.
    Image,
}

/// A diagram root node found by a content scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub node: NodeHandle,
    #[serde(default)]
    pub anchor: Option<SourceAnchor>,
    #[serde(default)]
    pub kind: DiagramKind,
}

/// Current layout sizes of a container and its diagram content.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurements {
    /// The container box.
    pub container: Size,
    /// The diagram's unscaled bounding box.
    pub content: Size,
}

/// Read-only queries the engine makes against the host.
pub trait Host {
    /// The view that currently has focus, if any.
    fn active_view_scope(&self) -> Option<ViewScope>;

    /// Whether `scope` still refers to an open view.
    fn is_view_open(&self, scope: &ViewScope) -> bool;

    /// Diagram root nodes inside the subtree at `root`.
    fn find_diagrams(&self, scope: &ViewScope, root: NodeHandle) -> Vec<DiagramNode>;

    /// Textual definition backing the diagram at `node`, if the host can resolve it.
    fn source_slice(&self, scope: &ViewScope, node: NodeHandle) -> Option<String>;

    /// Layout sizes of the container at `node`. `None` when the node is gone.
    fn measure(&self, node: NodeHandle) -> Option<Measurements>;

    /// Whether the container at `node` currently carries the folded class.
    fn is_folded(&self, node: NodeHandle) -> bool;

    /// Serialized SVG markup of the diagram at `node`.
    fn svg_markup(&self, node: NodeHandle) -> Option<String>;

    /// Display name of the document open in `scope`, used for export file names.
    fn document_name(&self, scope: &ViewScope) -> Option<String>;
}

/// Presentation side effects the engine asks the host to perform.
pub trait Presenter {
    /// Apply a CSS transform to the diagram content at `node`.
    fn render_transform(&mut self, node: NodeHandle, css: &str, animate: bool);

    /// Show a short-lived notice to the user.
    fn show_transient_message(&mut self, text: &str);

    /// Put `text` on the clipboard.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Clipboard`] when the host refuses the write.
    fn write_clipboard(&mut self, text: &str) -> Result<(), ExportError>;

    /// Write an exported artifact.
    ///
    /// # Errors
    ///
    /// Returns an [`ExportError`] when the artifact cannot be produced or saved.
    fn save_export(&mut self, request: &ExportRequest) -> Result<(), ExportError>;

    /// Every other effect (panels, fold class, fullscreen, observers, indicator).
    fn apply(&mut self, effect: &Effect) {
        tracing::trace!(?effect, "effect not handled by presenter");
    }
}
