//! Export naming and SVG document preparation.
//!
//! The bytes are written by the host; this module decides what gets written
//! and under which name. File names follow
//! `<prefix>_<document-name>_<container-id>_<timestamp>.<ext>`.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use serde::{Deserialize, Serialize};

use crate::consts::SVG_XML_PREFACE;
use crate::host::NodeHandle;
use crate::registry::ContainerId;

/// Error raised by export and clipboard collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// The container holds no SVG element.
    #[error("no SVG found in diagram")]
    NoSvg,
    /// The container holds no raster image.
    #[error("no image found in diagram")]
    NoImage,
    /// The host rejected the clipboard write (permissions, focus).
    #[error("clipboard write rejected: {0}")]
    Clipboard(String),
    /// The host failed to fetch or save the artifact.
    #[error("export failed: {0}")]
    Write(String),
}

/// Exported artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

/// Everything the host needs to write one exported file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Container whose diagram is exported.
    pub node: NodeHandle,
    pub format: ExportFormat,
    pub file_name: String,
    /// Complete SVG document for [`ExportFormat::Svg`]; `None` for PNG, which
    /// the host fetches from the rendered image's source.
    pub svg_document: Option<String>,
}

/// Build the export file name.
#[must_use]
pub fn export_file_name(
    prefix: &str,
    document_name: &str,
    id: ContainerId,
    timestamp_ms: u64,
    format: ExportFormat,
) -> String {
    format!(
        "{prefix}_{}_{id}_{timestamp_ms}.{}",
        sanitize_document_name(document_name),
        format.extension()
    )
}

/// Reduce a document name or path to a file-name-safe stem.
///
/// Directories and a trailing extension are dropped; whitespace and reserved
/// characters become `-`. An empty result falls back to `untitled`.
#[must_use]
pub fn sanitize_document_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    };
    let cleaned: String = stem
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '-'
            } else {
                c
            }
        })
        .collect();
    if cleaned.is_empty() { "untitled".to_owned() } else { cleaned }
}

/// Turn serialized SVG markup into a standalone document with the XML preface.
///
/// # Errors
///
/// Returns [`ExportError::NoSvg`] when the markup holds no `<svg` element.
pub fn svg_document(markup: &str) -> Result<String, ExportError> {
    let trimmed = markup.trim();
    if !trimmed.contains("<svg") {
        return Err(ExportError::NoSvg);
    }
    if trimmed.starts_with("<?xml") {
        return Ok(trimmed.to_owned());
    }
    Ok(format!("{SVG_XML_PREFACE}\n{trimmed}"))
}
