use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::node::{Attribute, Document, Element, NodeId, NodeKind};
use crate::error::{SvgError, SvgResult};

const XMLNS: &str = "xmlns";
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

pub struct Parser {
    source: String,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Parser {
            source: source.to_string(),
        }
    }

    /// Build a [`Document`] from the source.
    ///
    /// Whitespace is kept as text nodes; the writer decides what to drop.
    pub fn parse(&self) -> SvgResult<Document> {
        let mut reader = Reader::from_str(&self.source);
        reader.config_mut().trim_text(false);

        let mut doc = Document::new();
        let mut stack: Vec<NodeId> = vec![doc.root()];
        let mut scopes: Vec<Vec<(String, String)>> = Vec::new();

        loop {
            let parent = stack.last().copied().unwrap_or(doc.root());
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let id = self.open_element(&reader, &mut doc, &mut scopes, parent, &e)?;
                    stack.push(id);
                }
                Ok(Event::Empty(e)) => {
                    self.open_element(&reader, &mut doc, &mut scopes, parent, &e)?;
                    scopes.pop();
                }
                Ok(Event::End(_)) => {
                    if stack.len() <= 1 {
                        return Err(self.error_at(&reader, "unexpected closing tag"));
                    }
                    stack.pop();
                    scopes.pop();
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .decode()
                        .map_err(|err| self.error_at(&reader, &err.to_string()))?;
                    doc.push_text(parent, &text);
                }
                Ok(Event::GeneralRef(e)) => {
                    let name = e
                        .decode()
                        .map_err(|err| self.error_at(&reader, &err.to_string()))?;
                    let reference = format!("&{name};");
                    match quick_xml::escape::unescape(&reference) {
                        Ok(resolved) => doc.push_text(parent, &resolved),
                        Err(_) => {
                            let node = doc.create(NodeKind::EntityRef(name.to_string()));
                            doc.append_child(parent, node);
                        }
                    }
                }
                Ok(Event::CData(e)) => {
                    let text = self.decode(&reader, &e)?;
                    let node = doc.create(NodeKind::CData(text));
                    doc.append_child(parent, node);
                }
                Ok(Event::Comment(e)) => {
                    let text = self.decode(&reader, &e)?;
                    let node = doc.create(NodeKind::Comment(text));
                    doc.append_child(parent, node);
                }
                Ok(Event::PI(e)) => {
                    let text = self.decode(&reader, &e)?;
                    let node = doc.create(NodeKind::ProcessingInstruction(text));
                    doc.append_child(parent, node);
                }
                Ok(Event::DocType(e)) => {
                    let text = self.decode(&reader, &e)?;
                    let node = doc.create(NodeKind::DocType(text.trim().to_string()));
                    doc.append_child(parent, node);
                }
                Ok(Event::Eof) => break,
                // XML declaration: the writer emits its own
                Ok(_) => {}
                Err(err) => return Err(self.error_at(&reader, &err.to_string())),
            }
        }

        if stack.len() > 1 {
            return Err(SvgError::Parse("unexpected end of document: unclosed element".into()));
        }
        if doc.root_element().is_none() {
            return Err(SvgError::Parse("document has no root element".into()));
        }
        Ok(doc)
    }

    fn open_element(
        &self,
        reader: &Reader<&[u8]>,
        doc: &mut Document,
        scopes: &mut Vec<Vec<(String, String)>>,
        parent: NodeId,
        start: &BytesStart<'_>,
    ) -> SvgResult<NodeId> {
        let name = self.decode(reader, start.name().as_ref())?;

        let mut attributes = Vec::new();
        let mut scope = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|err| self.error_at(reader, &err.to_string()))?;
            let key = self.decode(reader, attr.key.as_ref())?;
            let raw = self.decode(reader, &attr.value)?;
            let (value, verbatim) = match quick_xml::escape::unescape(&raw) {
                Ok(value) => (value.into_owned(), false),
                Err(_) => (raw, true),
            };
            if key == XMLNS {
                scope.push((String::new(), value.clone()));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                scope.push((prefix.to_string(), value.clone()));
            }
            attributes.push(Attribute {
                name: key,
                value,
                verbatim,
            });
        }
        scopes.push(scope);

        let prefix = name.split_once(':').map(|(prefix, _)| prefix).unwrap_or("");
        let namespace = resolve_namespace(scopes, prefix);

        let mut element = Element::new(&name, namespace);
        element.attributes = attributes;
        let id = doc.create(NodeKind::Element(element));
        doc.append_child(parent, id);
        Ok(id)
    }

    fn decode(&self, reader: &Reader<&[u8]>, bytes: &[u8]) -> SvgResult<String> {
        reader
            .decoder()
            .decode(bytes)
            .map(|text| text.into_owned())
            .map_err(|err| self.error_at(reader, &err.to_string()))
    }

    fn error_at(&self, reader: &Reader<&[u8]>, message: &str) -> SvgError {
        SvgError::Parse(format!("{} (at byte {})", message, reader.buffer_position()))
    }
}

/// Innermost binding wins; `xml` is always bound.
fn resolve_namespace(scopes: &[Vec<(String, String)>], prefix: &str) -> Option<String> {
    if prefix == "xml" {
        return Some(XML_NAMESPACE.to_string());
    }
    scopes
        .iter()
        .rev()
        .flat_map(|scope| scope.iter())
        .find(|(bound, _)| bound == prefix)
        .map(|(_, uri)| uri.clone())
        .filter(|uri| !uri.is_empty())
}

/// Parse an SVG document held in memory.
pub fn parse_str(source: &str) -> SvgResult<Document> {
    Parser::new(source).parse()
}

/// Parse raw bytes; the input must be UTF-8.
pub fn parse_bytes(bytes: &[u8]) -> SvgResult<Document> {
    let source = std::str::from_utf8(bytes)
        .map_err(|err| SvgError::Parse(format!("input is not valid UTF-8: {err}")))?;
    parse_str(source.trim_start_matches('\u{feff}'))
}
