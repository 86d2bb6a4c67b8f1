use std::collections::{HashMap, HashSet};

use super::*;
use crate::transform::Size;

/// In-memory host for unit tests. Views are open unless listed in `closed`.
#[derive(Debug, Default)]
pub(crate) struct FakeHost {
    pub active: Option<ViewScope>,
    pub closed: HashSet<ViewScope>,
    pub diagrams: HashMap<NodeHandle, Vec<DiagramNode>>,
    pub sources: HashMap<NodeHandle, String>,
    pub sizes: HashMap<NodeHandle, Measurements>,
    pub folded: HashSet<NodeHandle>,
    pub svg: HashMap<NodeHandle, String>,
    pub document: Option<String>,
    pub clipboard_fails: bool,
    pub export_fails: bool,

    pub renders: Vec<(NodeHandle, String, bool)>,
    pub messages: Vec<String>,
    pub clipboard: Vec<String>,
    pub exports: Vec<ExportRequest>,
    pub applied: Vec<Effect>,
}

impl FakeHost {
    /// Put diagrams `nodes` under `root`, each with a 200x100 container
    /// holding 100x50 content.
    pub fn mount(&mut self, root: NodeHandle, nodes: Vec<DiagramNode>) {
        for diagram in &nodes {
            self.sizes.entry(diagram.node).or_insert(Measurements {
                container: Size::new(200.0, 100.0),
                content: Size::new(100.0, 50.0),
            });
        }
        self.diagrams.insert(root, nodes);
    }
}

pub(crate) fn diagram(node: u32, anchor: Option<SourceAnchor>) -> DiagramNode {
    DiagramNode { node: NodeHandle(node), anchor, kind: DiagramKind::Svg }
}

pub(crate) fn image_diagram(node: u32, anchor: Option<SourceAnchor>) -> DiagramNode {
    DiagramNode { node: NodeHandle(node), anchor, kind: DiagramKind::Image }
}

pub(crate) fn anchor(path: &str, line: u32) -> SourceAnchor {
    SourceAnchor { path: path.to_owned(), line, ordinal: 0 }
}

impl Host for FakeHost {
    fn active_view_scope(&self) -> Option<ViewScope> {
        self.active.clone()
    }

    fn is_view_open(&self, scope: &ViewScope) -> bool {
        !self.closed.contains(scope)
    }

    fn find_diagrams(&self, _scope: &ViewScope, root: NodeHandle) -> Vec<DiagramNode> {
        self.diagrams.get(&root).cloned().unwrap_or_default()
    }

    fn source_slice(&self, _scope: &ViewScope, node: NodeHandle) -> Option<String> {
        self.sources.get(&node).cloned()
    }

    fn measure(&self, node: NodeHandle) -> Option<Measurements> {
        self.sizes.get(&node).copied()
    }

    fn is_folded(&self, node: NodeHandle) -> bool {
        self.folded.contains(&node)
    }

    fn svg_markup(&self, node: NodeHandle) -> Option<String> {
        self.svg.get(&node).cloned()
    }

    fn document_name(&self, _scope: &ViewScope) -> Option<String> {
        self.document.clone()
    }
}

impl Presenter for FakeHost {
    fn render_transform(&mut self, node: NodeHandle, css: &str, animate: bool) {
        self.renders.push((node, css.to_owned(), animate));
    }

    fn show_transient_message(&mut self, text: &str) {
        self.messages.push(text.to_owned());
    }

    fn write_clipboard(&mut self, text: &str) -> Result<(), ExportError> {
        if self.clipboard_fails {
            return Err(ExportError::Clipboard("document is not focused".to_owned()));
        }
        self.clipboard.push(text.to_owned());
        Ok(())
    }

    fn save_export(&mut self, request: &ExportRequest) -> Result<(), ExportError> {
        if self.export_fails {
            return Err(ExportError::Write("disk full".to_owned()));
        }
        self.exports.push(request.clone());
        Ok(())
    }

    fn apply(&mut self, effect: &Effect) {
        self.applied.push(effect.clone());
    }
}

// =============================================================
// Host types
// =============================================================

#[test]
fn node_handle_display() {
    assert_eq!(NodeHandle(42).to_string(), "#42");
}

#[test]
fn diagram_node_deserializes_with_defaults() {
    let node: DiagramNode = serde_json::from_str(r#"{"node":7}"#).unwrap();
    assert_eq!(node.node, NodeHandle(7));
    assert_eq!(node.anchor, None);
    assert_eq!(node.kind, DiagramKind::Svg);
}

#[test]
fn diagram_node_reads_anchor_and_kind() {
    let raw = r#"{"node":3,"anchor":{"path":"a.md","line":4},"kind":"image"}"#;
    let node: DiagramNode = serde_json::from_str(raw).unwrap();
    assert_eq!(node.anchor, Some(anchor("a.md", 4)));
    assert_eq!(node.kind, DiagramKind::Image);
}

#[test]
fn default_presenter_apply_is_a_no_op() {
    struct Silent;
    impl Presenter for Silent {
        fn render_transform(&mut self, _: NodeHandle, _: &str, _: bool) {}
        fn show_transient_message(&mut self, _: &str) {}
        fn write_clipboard(&mut self, _: &str) -> Result<(), ExportError> {
            Ok(())
        }
        fn save_export(&mut self, _: &ExportRequest) -> Result<(), ExportError> {
            Ok(())
        }
    }
    Silent.apply(&Effect::Message { text: "hi".to_owned() });
}
