//! Minimal mutable XML tree for SVG documents.
//!
//! - [`node`]: arena storage, navigation and mutation
//! - [`parser`]: builds a [`Document`] from quick-xml events
//! - [`writer`]: indented serializer with an XML declaration

pub mod node;
pub mod parser;
pub mod writer;

pub use node::{Attribute, Document, Element, NodeId, NodeKind};
pub use parser::{Parser, parse_bytes, parse_str};
pub use writer::{Writer, to_string};
