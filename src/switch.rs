//! `<switch>` blocks and the text variants inside them.

use crate::dom::{Document, NodeId};
use crate::text::read_segments;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const SYSTEM_LANGUAGE: &str = "systemLanguage";

/// One `<text>` child of a switch.
#[derive(Debug, Clone, PartialEq)]
pub struct TextVariant {
    /// `systemLanguage` value, `None` for the default node
    pub language: Option<String>,
    /// Raw text runs, see [`crate::text::read_segments`]
    pub segments: Vec<String>,
    pub source_node_id: Option<String>,
    pub node: NodeId,
}

impl TextVariant {
    fn read(doc: &Document, node: NodeId) -> Self {
        let language = doc
            .attribute(node, SYSTEM_LANGUAGE)
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string);
        TextVariant {
            language,
            segments: read_segments(doc, node),
            source_node_id: doc.attribute(node, "id").map(str::to_string),
            node,
        }
    }

    pub fn is_default(&self) -> bool {
        self.language.is_none()
    }
}

/// A `<switch>` element with its `<text>` children partitioned.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchBlock {
    pub node: NodeId,
    /// First `<text>` child without `systemLanguage`
    pub default: Option<TextVariant>,
    /// `<text>` children with `systemLanguage`, in document order
    pub variants: Vec<TextVariant>,
}

impl SwitchBlock {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Existing variant for `language`, compared by the exact attribute value.
    pub fn variant(&self, language: &str) -> Option<&TextVariant> {
        self.variants
            .iter()
            .find(|variant| variant.language.as_deref() == Some(language))
    }
}

/// Every SVG `<switch>` in the document that has at least one `<text>` child.
///
/// Switches without a default text are returned too (with `default: None`);
/// callers skip them.
pub fn scan(doc: &Document) -> Vec<SwitchBlock> {
    let mut blocks = Vec::new();
    for node in doc.descendants(doc.root()) {
        if !doc.is_element(node, SVG_NS, "switch") {
            continue;
        }
        let texts = doc.child_elements(node, SVG_NS, "text");
        if texts.is_empty() {
            continue;
        }

        let mut default = None;
        let mut variants = Vec::new();
        for text in texts {
            let variant = TextVariant::read(doc, text);
            if !variant.is_default() {
                variants.push(variant);
            } else if default.is_none() {
                default = Some(variant);
            } else {
                tracing::debug!("Ignoring extra default text in switch (node {})", node);
            }
        }

        blocks.push(SwitchBlock {
            node,
            default,
            variants,
        });
    }
    tracing::debug!("Found {} switch elements with text", blocks.len());
    blocks
}
