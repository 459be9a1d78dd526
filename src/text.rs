//! Text normalization and segment reading.
//!
//! A *segment* is one run of text inside a `<text>` node: one per child
//! `<tspan>`, or the node's own text when it has no `<tspan>` children.
//! Extraction and injection both read segments through [`read_segments`]
//! so that segment counts are comparable.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Document, NodeId, NodeKind};
use crate::switch::SVG_NS;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Trim and collapse every run of whitespace to one space.
///
/// ```ignore
/// assert_eq!(normalize_text("  Rear   speakers\n carry "), "Rear speakers carry");
/// ```
pub fn normalize_text(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Normalize, then lower-case when `case_insensitive` is set.
pub fn fold_text(text: &str, case_insensitive: bool) -> String {
    let normalized = normalize_text(text);
    if case_insensitive {
        normalized.to_lowercase()
    } else {
        normalized
    }
}

/// Raw text runs of a `<text>` node, in document order.
///
/// Never empty: a node without text yields a single empty segment.
pub fn read_segments(doc: &Document, node: NodeId) -> Vec<String> {
    let tspans = doc.child_elements(node, SVG_NS, "tspan");
    if tspans.is_empty() {
        return vec![doc.direct_text(node)];
    }
    tspans
        .into_iter()
        .map(|tspan| doc.direct_text(tspan))
        .collect()
}

/// [`read_segments`] with each run passed through [`fold_text`].
pub fn read_normalized_segments(
    doc: &Document,
    node: NodeId,
    case_insensitive: bool,
) -> Vec<String> {
    read_segments(doc, node)
        .iter()
        .map(|segment| fold_text(segment, case_insensitive))
        .collect()
}

/// Overwrite the text runs of `node` with `segments`.
///
/// The caller guarantees `segments.len()` equals the node's segment count.
/// When `node` has `<tspan>` children, any non-blank text of its own is
/// removed: it is not a segment and would otherwise stay untranslated.
pub fn write_segments(doc: &mut Document, node: NodeId, segments: &[String]) {
    let tspans = doc.child_elements(node, SVG_NS, "tspan");
    if tspans.is_empty() {
        let text = segments.first().map(String::as_str).unwrap_or("");
        doc.set_direct_text(node, text);
        return;
    }

    let stray: Vec<NodeId> = doc
        .children(node)
        .iter()
        .copied()
        .filter(|&child| match doc.kind(child) {
            NodeKind::Text(text) | NodeKind::CData(text) => !text.trim().is_empty(),
            NodeKind::EntityRef(_) => true,
            _ => false,
        })
        .collect();
    for child in stray {
        doc.detach(child);
    }

    for (tspan, text) in tspans.into_iter().zip(segments) {
        doc.set_direct_text(tspan, text);
    }
}
