use serde::Serialize;

use crate::dom::{Document, NodeId};
use crate::switch::SVG_NS;

/// A `<tspan>` that contains another `<tspan>`.
///
/// Such text cannot be split into segments that line up with a translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestedTspan {
    pub id: Option<String>,
    /// Direct text of the outer tspan followed by each inner tspan's text
    pub text: String,
}

/// Every tspan with tspan children, in document order.
pub fn find_nested_tspans(doc: &Document) -> Vec<NestedTspan> {
    nested_tspans_in(doc, doc.root())
}

/// [`find_nested_tspans`] restricted to the subtree below `node`.
pub fn nested_tspans_in(doc: &Document, node: NodeId) -> Vec<NestedTspan> {
    doc.descendants(node)
        .into_iter()
        .filter(|&node| doc.is_element(node, SVG_NS, "tspan"))
        .filter_map(|node| {
            let inner = doc.child_elements(node, SVG_NS, "tspan");
            if inner.is_empty() {
                return None;
            }
            let mut text = doc.direct_text(node);
            for child in inner {
                text.push_str(&doc.direct_text(child));
            }
            Some(NestedTspan {
                id: doc.attribute(node, "id").map(str::to_string),
                text: text.trim().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_str;

    #[test]
    fn test_find_nested_tspans() {
        let doc = parse_str(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
  <text><tspan id="outer">Hello <tspan id="inner">world</tspan></tspan></text>
  <text><tspan id="flat">Plain</tspan></text>
</svg>"#,
        )
        .unwrap();
        let nested = find_nested_tspans(&doc);
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].id.as_deref(), Some("outer"));
        assert_eq!(nested[0].text, "Hello world");
    }

    #[test]
    fn test_nested_tspans_in_subtree() {
        let doc = parse_str(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
  <text id="clean"><tspan>a</tspan></text>
  <text id="dirty"><tspan>b <tspan>c</tspan></tspan></text>
</svg>"#,
        )
        .unwrap();
        let svg = doc.root_element().unwrap();
        let texts = doc.child_elements(svg, SVG_NS, "text");
        assert!(nested_tspans_in(&doc, texts[0]).is_empty());
        assert_eq!(nested_tspans_in(&doc, texts[1]).len(), 1);
    }

    #[test]
    fn test_clean_document_has_none() {
        let doc = parse_str(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text><tspan>a</tspan><tspan>b</tspan></text></svg>"#,
        )
        .unwrap();
        assert!(find_nested_tspans(&doc).is_empty());
    }
}
