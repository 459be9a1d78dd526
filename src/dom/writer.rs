use quick_xml::escape::partial_escape;

use super::node::{Document, NodeId, NodeKind};

pub const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>";

/// Serializes a [`Document`] as indented UTF-8 XML.
///
/// Element-only content is re-indented and its whitespace-only text is
/// dropped. Mixed content and anything under `xml:space="preserve"` is
/// written exactly as stored.
pub struct Writer<'a> {
    doc: &'a Document,
    indent: &'a str,
    out: String,
}

impl<'a> Writer<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Writer {
            doc,
            indent: "  ",
            out: String::new(),
        }
    }

    pub fn with_indent(mut self, indent: &'a str) -> Self {
        self.indent = indent;
        self
    }

    pub fn write(mut self) -> String {
        let doc = self.doc;
        self.out.push_str(XML_DECLARATION);
        self.out.push('\n');
        for &child in doc.children(doc.root()) {
            if self.is_blank(child) {
                continue;
            }
            self.write_node(child, 0, true, false);
            self.out.push('\n');
        }
        self.out
    }

    fn write_node(&mut self, id: NodeId, depth: usize, pretty: bool, preserve: bool) {
        let doc = self.doc;
        match doc.kind(id) {
            NodeKind::Document => {}
            NodeKind::Element(element) => {
                self.out.push('<');
                self.out.push_str(&element.name);
                for attr in &element.attributes {
                    self.out.push(' ');
                    self.out.push_str(&attr.name);
                    self.out.push_str("=\"");
                    if attr.verbatim {
                        self.out.push_str(&attr.value.replace('"', "&quot;"));
                    } else {
                        self.out.push_str(&escape_attribute(&attr.value));
                    }
                    self.out.push('"');
                }

                let children = doc.children(id);
                if children.is_empty() {
                    self.out.push_str("/>");
                    return;
                }
                self.out.push('>');

                let preserve = match element.attribute("xml:space") {
                    Some("preserve") => true,
                    Some("default") => false,
                    _ => preserve,
                };

                if pretty && !preserve && self.is_element_only(id) {
                    for &child in children {
                        if self.is_blank(child) {
                            continue;
                        }
                        self.newline(depth + 1);
                        self.write_node(child, depth + 1, true, preserve);
                    }
                    self.newline(depth);
                } else {
                    for &child in children {
                        self.write_node(child, depth + 1, false, preserve);
                    }
                }

                self.out.push_str("</");
                self.out.push_str(&element.name);
                self.out.push('>');
            }
            NodeKind::Text(text) => self.out.push_str(&partial_escape(text.as_str())),
            NodeKind::CData(text) => {
                self.out.push_str("<![CDATA[");
                self.out.push_str(text);
                self.out.push_str("]]>");
            }
            NodeKind::Comment(text) => {
                self.out.push_str("<!--");
                self.out.push_str(text);
                self.out.push_str("-->");
            }
            NodeKind::ProcessingInstruction(text) => {
                self.out.push_str("<?");
                self.out.push_str(text);
                self.out.push_str("?>");
            }
            NodeKind::DocType(text) => {
                self.out.push_str("<!DOCTYPE ");
                self.out.push_str(text);
                self.out.push('>');
            }
            NodeKind::EntityRef(name) => {
                self.out.push('&');
                self.out.push_str(name);
                self.out.push(';');
            }
        }
    }

    /// Children are elements, comments or PIs plus whitespace-only text.
    fn is_element_only(&self, id: NodeId) -> bool {
        let children = self.doc.children(id);
        let mut has_markup = false;
        for &child in children {
            match self.doc.kind(child) {
                NodeKind::Text(text) if text.trim().is_empty() => {}
                NodeKind::Element(_)
                | NodeKind::Comment(_)
                | NodeKind::ProcessingInstruction(_) => has_markup = true,
                _ => return false,
            }
        }
        has_markup
    }

    fn is_blank(&self, id: NodeId) -> bool {
        matches!(self.doc.kind(id), NodeKind::Text(text) if text.trim().is_empty())
    }

    fn newline(&mut self, depth: usize) {
        self.out.push('\n');
        for _ in 0..depth {
            self.out.push_str(self.indent);
        }
    }
}

/// Escape an attribute value for a double-quoted attribute.
///
/// Apostrophes and `>` are left alone so that values such as
/// `font-family:'DejaVu Sans'` keep their source form.
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Serialize with the default two-space indent.
pub fn to_string(doc: &Document) -> String {
    Writer::new(doc).write()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_str;

    #[test]
    fn test_declaration_and_indent() {
        let doc = parse_str("<svg><g><rect/></g></svg>").unwrap();
        assert_eq!(
            to_string(&doc),
            "<?xml version='1.0' encoding='UTF-8'?>\n<svg>\n  <g>\n    <rect/>\n  </g>\n</svg>\n"
        );
    }

    #[test]
    fn test_blank_text_is_reindented() {
        let doc = parse_str("<svg>\n\n      <g>   <rect/>\n</g>\n</svg>").unwrap();
        assert_eq!(
            to_string(&doc),
            "<?xml version='1.0' encoding='UTF-8'?>\n<svg>\n  <g>\n    <rect/>\n  </g>\n</svg>\n"
        );
    }

    #[test]
    fn test_mixed_content_is_verbatim() {
        let doc = parse_str("<svg><text>a <tspan>b</tspan> c</text></svg>").unwrap();
        assert!(to_string(&doc).contains("<text>a <tspan>b</tspan> c</text>"));
    }

    #[test]
    fn test_preserve_space_is_verbatim() {
        let source = "<svg><text xml:space=\"preserve\">\n  <tspan>b</tspan>\n</text></svg>";
        let doc = parse_str(source).unwrap();
        assert!(
            to_string(&doc).contains("<text xml:space=\"preserve\">\n  <tspan>b</tspan>\n</text>")
        );
    }

    #[test]
    fn test_escaping() {
        let doc = parse_str(r#"<svg><text id="a&quot;b">x &lt; y &amp; z</text></svg>"#).unwrap();
        let out = to_string(&doc);
        assert!(out.contains(r#"id="a&quot;b""#));
        assert!(out.contains("x &lt; y &amp; z"));
    }

    #[test]
    fn test_apostrophes_in_attributes_are_not_escaped() {
        let source = r#"<svg><g style="font-family:'DejaVu Sans'" title="a &amp; &lt;b&gt;"/></svg>"#;
        let out = to_string(&parse_str(source).unwrap());
        assert!(out.contains(r#"style="font-family:'DejaVu Sans'""#));
        assert!(out.contains(r#"title="a &amp; &lt;b>""#));
        assert!(!out.contains("&apos;"));
    }

    #[test]
    fn test_unknown_entity_in_attribute_round_trips() {
        let source = r#"<svg><text title="a &custom; b" label='say "hi" &custom;'/></svg>"#;
        let doc = parse_str(source).unwrap();
        let out = to_string(&doc);
        assert!(out.contains(r#"title="a &custom; b""#));
        assert!(out.contains(r#"label="say &quot;hi&quot; &custom;""#));
        assert!(!out.contains("&amp;custom;"));
        assert_eq!(to_string(&parse_str(&out).unwrap()), out);
    }

    #[test]
    fn test_comments_and_doctype_survive() {
        let source = "<?xml version=\"1.0\"?>\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n<!-- made by hand --><svg><![CDATA[raw <data>]]>&ns_svg;</svg>";
        let out = to_string(&parse_str(source).unwrap());
        assert!(out.contains("<!DOCTYPE svg PUBLIC"));
        assert!(out.contains("<!-- made by hand -->"));
        assert!(out.contains("<![CDATA[raw <data>]]>&ns_svg;"));
    }

    #[test]
    fn test_output_reparses_to_same_text() {
        let source = "<svg xmlns=\"http://www.w3.org/2000/svg\"><switch><text id=\"t\"><tspan>Hello</tspan></text></switch></svg>";
        let doc = parse_str(source).unwrap();
        let again = parse_str(&to_string(&doc)).unwrap();
        assert_eq!(to_string(&again), to_string(&doc));
    }
}
