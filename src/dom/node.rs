//! Arena-backed XML tree.
//!
//! Nodes are addressed by [`NodeId`], an index into the document arena.
//! Cloning a subtree or moving a node is an index operation; nothing
//! ever holds a reference into another node.

/// Index into the document arena
pub type NodeId = usize;

/// Kind of an XML node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Document root, always at index 0
    Document,
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
    /// Entity reference that is neither predefined nor a character reference,
    /// kept verbatim so it round-trips
    EntityRef(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Qualified name as written (`id`, `xml:space`, `inkscape:label`)
    pub name: String,
    /// Unescaped value, or the source text when `verbatim` is set
    pub value: String,
    /// The source value refers to an entity the parser cannot resolve,
    /// so `value` is kept escaped as written.
    pub verbatim: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name as written in the source (`switch` or `svg:switch`)
    pub name: String,
    /// Resolved namespace URI
    pub namespace: Option<String>,
    pub attributes: Vec<Attribute>,
}

impl Element {
    pub fn new(name: &str, namespace: Option<String>) -> Self {
        Element {
            name: name.to_string(),
            namespace,
            attributes: Vec::new(),
        }
    }

    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => {
                attr.value = value.to_string();
                attr.verbatim = false;
            }
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
                verbatim: false,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// An XML document stored as a flat arena of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Document {
            nodes: vec![Node::new(NodeKind::Document)],
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    /// The single top-level element (`<svg>`), if any.
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    /// No-op on non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element.set_attribute(name, value);
        }
    }

    /// Whether `id` is an element with the given namespace and local name.
    pub fn is_element(&self, id: NodeId, namespace: &str, local_name: &str) -> bool {
        self.element(id).is_some_and(|element| {
            element.local_name() == local_name && element.namespace.as_deref() == Some(namespace)
        })
    }

    /// Direct element children matching namespace and local name, in order.
    pub fn child_elements(&self, id: NodeId, namespace: &str, local_name: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child, namespace, local_name))
            .collect()
    }

    /// All nodes below `id` in document order (pre-order), excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Every `id` attribute value in the document.
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.descendants(self.root())
            .into_iter()
            .filter_map(move |node| self.attribute(node, "id"))
    }

    /// Allocate a detached node.
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node::new(kind));
        self.nodes.len() - 1
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Insert `child` right before `reference`, or append if `reference`
    /// is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        self.detach(child);
        let position = self.nodes[parent]
            .children
            .iter()
            .position(|&id| id == reference)
            .unwrap_or(self.nodes[parent].children.len());
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.insert(position, child);
    }

    /// Unlink a node from its parent. The node stays in the arena.
    pub fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.nodes[child].parent.take() {
            self.nodes[parent].children.retain(|&id| id != child);
        }
    }

    /// Deep copy of the subtree at `id`; the copy is detached.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let copy = self.create(self.nodes[id].kind.clone());
        let children = self.nodes[id].children.clone();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.nodes[child_copy].parent = Some(copy);
            self.nodes[copy].children.push(child_copy);
        }
        copy
    }

    /// Concatenated text of the direct text children of `id`.
    ///
    /// Text inside child elements is not included.
    pub fn direct_text(&self, id: NodeId) -> String {
        let mut text = String::new();
        for &child in self.children(id) {
            match self.kind(child) {
                NodeKind::Text(value) | NodeKind::CData(value) => text.push_str(value),
                NodeKind::EntityRef(name) => {
                    text.push('&');
                    text.push_str(name);
                    text.push(';');
                }
                _ => {}
            }
        }
        text
    }

    /// Replace the direct text of `id` with a single leading text node.
    ///
    /// Child elements are left in place.
    pub fn set_direct_text(&mut self, id: NodeId, text: &str) {
        let text_children: Vec<NodeId> = self
            .children(id)
            .iter()
            .copied()
            .filter(|&child| {
                matches!(
                    self.kind(child),
                    NodeKind::Text(_) | NodeKind::CData(_) | NodeKind::EntityRef(_)
                )
            })
            .collect();
        for child in text_children {
            self.detach(child);
        }
        if text.is_empty() {
            return;
        }
        let node = self.create(NodeKind::Text(text.to_string()));
        self.nodes[node].parent = Some(id);
        self.nodes[id].children.insert(0, node);
    }

    /// Append text under `parent`, merging with a trailing text node.
    pub(crate) fn push_text(&mut self, parent: NodeId, text: &str) {
        let last = self.nodes[parent].children.last().copied();
        if let Some(last) = last
            && let NodeKind::Text(existing) = &mut self.nodes[last].kind
        {
            existing.push_str(text);
            return;
        }
        let node = self.create(NodeKind::Text(text.to_string()));
        self.append_child(parent, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://www.w3.org/2000/svg";

    fn element(doc: &mut Document, parent: NodeId, name: &str) -> NodeId {
        let id = doc.create(NodeKind::Element(Element::new(name, Some(NS.to_string()))));
        doc.append_child(parent, id);
        id
    }

    #[test]
    fn test_local_name_and_prefix() {
        let el = Element::new("svg:switch", Some(NS.to_string()));
        assert_eq!(el.local_name(), "switch");
        assert_eq!(el.prefix(), Some("svg"));
        let el = Element::new("text", None);
        assert_eq!(el.local_name(), "text");
        assert_eq!(el.prefix(), None);
    }

    #[test]
    fn test_set_attribute_keeps_order() {
        let mut el = Element::new("text", None);
        el.set_attribute("x", "1");
        el.set_attribute("id", "a");
        el.set_attribute("x", "2");
        let names: Vec<_> = el.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["x", "id"]);
        assert_eq!(el.attribute("x"), Some("2"));
    }

    #[test]
    fn test_deep_clone_is_detached_copy() {
        let mut doc = Document::new();
        let svg = element(&mut doc, 0, "svg");
        let text = element(&mut doc, svg, "text");
        let tspan = element(&mut doc, text, "tspan");
        doc.push_text(tspan, "hello");

        let copy = doc.deep_clone(text);
        assert_eq!(doc.parent(copy), None);
        assert_eq!(doc.children(copy).len(), 1);

        let copied_tspan = doc.children(copy)[0];
        assert_ne!(copied_tspan, tspan);
        assert_eq!(doc.direct_text(copied_tspan), "hello");

        doc.set_direct_text(copied_tspan, "bonjour");
        assert_eq!(doc.direct_text(tspan), "hello");
    }

    #[test]
    fn test_insert_before_and_detach() {
        let mut doc = Document::new();
        let svg = element(&mut doc, 0, "svg");
        let a = element(&mut doc, svg, "a");
        let b = element(&mut doc, svg, "b");
        let c = doc.create(NodeKind::Element(Element::new("c", None)));

        doc.insert_before(svg, c, b);
        assert_eq!(doc.children(svg), &[a, c, b]);

        doc.append_child(svg, a);
        assert_eq!(doc.children(svg), &[c, b, a]);

        doc.detach(b);
        assert_eq!(doc.children(svg), &[c, a]);
        assert_eq!(doc.parent(b), None);
    }

    #[test]
    fn test_set_direct_text_keeps_child_elements() {
        let mut doc = Document::new();
        let text = element(&mut doc, 0, "text");
        doc.push_text(text, "before ");
        let tspan = element(&mut doc, text, "tspan");
        doc.push_text(text, " after");

        doc.set_direct_text(text, "replaced");
        assert_eq!(doc.direct_text(text), "replaced");
        assert_eq!(doc.children(text).len(), 2);
        assert_eq!(doc.children(text)[1], tspan);
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut doc = Document::new();
        let svg = element(&mut doc, 0, "svg");
        let g = element(&mut doc, svg, "g");
        let text = element(&mut doc, g, "text");
        let rect = element(&mut doc, svg, "rect");
        assert_eq!(doc.descendants(0), vec![svg, g, text, rect]);
    }
}
