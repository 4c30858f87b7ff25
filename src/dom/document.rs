//! XML Document - arena-based tree over an in-place buffer
//!
//! Efficient storage with:
//! - One writable byte buffer (owned copy or the caller's, parsed in place)
//! - Arena of elements addressed by NodeId
//! - Zero-copy tag, attribute and text strings via spans
//!
//! Once parsing returns the tree is immutable: every accessor takes `&self`
//! and a `Document` can be shared between reader threads.

use super::buffer::Buffer;
use super::node::{Element, NodeId, DOCUMENT_NODE};
use crate::core::error::ParseError;
use crate::core::parser::Parser;
use crate::options::ParseOptions;
use crate::query::path::path_segments;

/// A parsed XML document
#[derive(Debug)]
pub struct Document<'a> {
    /// Mutated input; every span points here
    buffer: Buffer<'a>,
    /// Arena of elements, node 0 is the document node
    nodes: Vec<Element>,
    /// Recoverable errors met during a lenient parse
    diagnostics: Vec<ParseError>,
}

/// Parse `buffer` into a document.
///
/// Pass `Buffer::copy_from` for copy mode or `Buffer::in_place` to parse the
/// caller's writable bytes directly.
pub fn parse_document<'a>(buffer: Buffer<'a>, options: &ParseOptions) -> Result<Document<'a>, ParseError> {
    Document::parse_with_options(buffer, options)
}

/// Release a document: element arrays first, then the buffer copy (if any)
pub fn free_document(doc: Document<'_>) {
    drop(doc.into_buffer());
}

impl Document<'static> {
    /// Parse a copy of `data` with default (lenient) options
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        Self::parse_with_options(Buffer::copy_from(data)?, &ParseOptions::default())
    }

    /// Parse a copy of `data` in strict mode
    pub fn parse_strict(data: &[u8]) -> Result<Self, ParseError> {
        Self::parse_with_options(Buffer::copy_from(data)?, &ParseOptions::strict())
    }
}

impl<'a> Document<'a> {
    /// Parse the caller's buffer in place with default options
    pub fn parse_in_place(data: &'a mut [u8]) -> Result<Self, ParseError> {
        Self::parse_with_options(Buffer::in_place(data), &ParseOptions::default())
    }

    /// Parse with explicit options
    pub fn parse_with_options(mut buffer: Buffer<'a>, options: &ParseOptions) -> Result<Self, ParseError> {
        let tree = Parser::new(buffer.as_bytes_mut(), options).parse()?;
        xml_log!(
            options,
            Debug,
            "parsed {} elements from {} bytes ({} diagnostics)",
            tree.nodes.len() - 1,
            buffer.len(),
            tree.diagnostics.len()
        );
        Ok(Document {
            buffer,
            nodes: tree.nodes,
            diagnostics: tree.diagnostics,
        })
    }

    /// Tear the tree down and hand back the (mutated) buffer
    pub fn into_buffer(mut self) -> Buffer<'a> {
        // Children before parents, mirroring ownership
        while let Some(mut node) = self.nodes.pop() {
            node.attributes.clear();
            node.children.clear();
        }
        self.buffer
    }

    /// The document node. Its only child is the top-level element.
    #[inline]
    pub fn root(&self) -> NodeId {
        DOCUMENT_NODE
    }

    /// The top-level element
    pub fn root_element(&self) -> NodeId {
        self.nodes[DOCUMENT_NODE as usize].children[0]
    }

    /// Get an element by ID
    #[inline]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id as usize)
    }

    /// Number of elements including the document node
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The mutated buffer, NUL terminators included
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    /// True when the document owns a copy of its input
    pub fn is_copied(&self) -> bool {
        self.buffer.is_copied()
    }

    /// Recoverable errors met while parsing (empty after a clean parse)
    pub fn diagnostics(&self) -> &[ParseError] {
        &self.diagnostics
    }

    /// Tag name as raw bytes
    pub fn tag_bytes(&self, id: NodeId) -> &[u8] {
        self.element(id)
            .map(|e| e.tag.slice(self.buffer()))
            .unwrap_or_default()
    }

    /// Tag name as string
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        let node = self.element(id)?;
        node.tag.as_str(self.buffer())
    }

    /// Direct text content; None for self-closed tags
    pub fn text(&self, id: NodeId) -> Option<&str> {
        let span = self.element(id)?.text?;
        span.as_str(self.buffer())
    }

    /// Text of the first child named `tag`
    pub fn child_text(&self, id: NodeId, tag: &str) -> Option<&str> {
        self.text(self.first_child(id, Some(tag))?)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.element(id)?.parent
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.element(id).map_or(0, Element::child_count)
    }

    pub fn attribute_count(&self, id: NodeId) -> usize {
        self.element(id).map_or(0, Element::attr_count)
    }

    /// False when a recoverable error abandoned this element's subtree
    pub fn is_complete(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|e| e.complete)
    }

    /// Iterate over direct children
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let children = self.element(id).map(|e| e.children.as_slice()).unwrap_or_default();
        ChildIter {
            inner: children.iter(),
        }
    }

    /// Iterate over attribute name/value pairs in document order
    pub fn attributes(&self, id: NodeId) -> AttributeIter<'_> {
        let attributes = self.element(id).map(|e| e.attributes.as_slice()).unwrap_or_default();
        AttributeIter {
            buf: self.buffer(),
            inner: attributes.iter(),
        }
    }

    /// First child, or the first child named `tag`
    pub fn first_child(&self, id: NodeId, tag: Option<&str>) -> Option<NodeId> {
        let children = &self.element(id)?.children;
        match tag {
            None => children.first().copied(),
            Some(tag) => children
                .iter()
                .copied()
                .find(|&c| self.tag_bytes(c) == tag.as_bytes()),
        }
    }

    /// Next sibling of `id`, or the next one named `tag`
    pub fn next_sibling(&self, id: NodeId, tag: Option<&str>) -> Option<NodeId> {
        let node = self.element(id)?;
        let siblings = &self.element(node.parent?)?.children;
        let mut rest = siblings.get(node.index as usize + 1..)?.iter().copied();
        match tag {
            None => rest.next(),
            Some(tag) => rest.find(|&s| self.tag_bytes(s) == tag.as_bytes()),
        }
    }

    /// Descend `a/b/c` one segment at a time via `first_child`.
    ///
    /// Empty segments are ignored; a segment longer than
    /// `MAX_SEGMENT_LEN` yields None.
    pub fn find_by_path(&self, id: NodeId, path: &str) -> Option<NodeId> {
        self.element(id)?;
        let mut current = id;
        for segment in path_segments(path) {
            current = self.first_child(current, Some(segment.ok()?))?;
        }
        Some(current)
    }

    /// First attribute named `name`
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let buf = self.buffer();
        self.element(id)?
            .attributes
            .iter()
            .find(|a| a.name.slice(buf) == name.as_bytes())
            .and_then(|a| a.value.as_str(buf))
    }

    /// Copy the text of the first child named `tag` into `dst`, NUL terminated.
    ///
    /// At most `dst.len() - 1` text bytes are copied. Returns the number of
    /// text bytes copied, zero when the child or its text is absent.
    pub fn get_text_copy(&self, id: NodeId, tag: &str, dst: &mut [u8]) -> usize {
        let Some(child) = self.first_child(id, Some(tag)) else {
            return 0;
        };
        let Some(span) = self.element(child).and_then(|e| e.text) else {
            return 0;
        };
        let Some(room) = dst.len().checked_sub(1) else {
            return 0;
        };
        let text = span.slice(self.buffer());
        let len = text.len().min(room);
        dst[..len].copy_from_slice(&text[..len]);
        dst[len] = 0;
        len
    }
}

/// Iterator over child elements
pub struct ChildIter<'d> {
    inner: std::slice::Iter<'d, NodeId>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ChildIter<'_> {}

/// Iterator over attribute name/value pairs; non UTF-8 pairs are skipped
pub struct AttributeIter<'d> {
    buf: &'d [u8],
    inner: std::slice::Iter<'d, super::node::Attribute>,
}

impl<'d> Iterator for AttributeIter<'d> {
    type Item = (&'d str, &'d str);

    fn next(&mut self) -> Option<Self::Item> {
        for attr in self.inner.by_ref() {
            if let (Some(name), Some(value)) = (attr.name.as_str(self.buf), attr.value.as_str(self.buf)) {
                return Some((name, value));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Severity;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple() {
        let doc = Document::parse(b"<tag attr=\"v\">text</tag>").unwrap();
        let tag = doc.first_child(doc.root(), None).unwrap();
        assert_eq!(tag, doc.root_element());
        assert_eq!(doc.tag(tag), Some("tag"));
        assert_eq!(doc.get_attribute(tag, "attr"), Some("v"));
        assert_eq!(doc.text(tag), Some("text"));
        assert_eq!(doc.child_count(tag), 0);
        assert!(doc.is_copied());
    }

    #[test]
    fn test_parse_nested() {
        let doc = Document::parse(b"<a><b><c/></b></a>").unwrap();
        let a = doc.first_child(doc.root(), None).unwrap();
        assert_eq!(doc.tag(a), Some("a"));
        assert_eq!(doc.child_count(a), 1);
        let b = doc.first_child(a, None).unwrap();
        assert_eq!(doc.tag(b), Some("b"));
        let c = doc.first_child(b, None).unwrap();
        assert_eq!(doc.tag(c), Some("c"));
        for id in [a, b, c] {
            assert_eq!(doc.attribute_count(id), 0);
        }
        assert_eq!(doc.find_by_path(doc.root(), "a/b/c"), Some(c));
        assert_eq!(doc.find_by_path(doc.root(), "a/x"), None);
        assert_eq!(doc.parent(c), Some(b));
    }

    #[test]
    fn test_self_closed_has_no_text() {
        let doc = Document::parse(b"<tag/>").unwrap();
        let tag = doc.root_element();
        assert_eq!(doc.text(tag), None);
        assert_eq!(doc.child_count(tag), 0);
        let mut dst = [0xffu8; 8];
        assert_eq!(doc.get_text_copy(doc.root(), "tag", &mut dst), 0);
    }

    #[test]
    fn test_siblings() {
        let doc = Document::parse(b"<root><a/><b/><a n='2'/></root>").unwrap();
        let root = doc.root_element();
        let first = doc.first_child(root, None).unwrap();

        let mut seen = vec![doc.tag(first).unwrap()];
        let mut cur = first;
        while let Some(next) = doc.next_sibling(cur, None) {
            seen.push(doc.tag(next).unwrap());
            cur = next;
        }
        assert_eq!(seen, vec!["a", "b", "a"]);

        let second_a = doc.next_sibling(first, Some("a")).unwrap();
        assert_eq!(doc.get_attribute(second_a, "n"), Some("2"));
        assert_eq!(doc.next_sibling(second_a, Some("a")), None);
        assert_eq!(doc.next_sibling(root, None), None);
    }

    #[test]
    fn test_first_attribute_wins() {
        let doc = Document::parse(b"<x k=\"1\" k=\"2\"/>").unwrap();
        let x = doc.root_element();
        assert_eq!(doc.attribute_count(x), 2);
        assert_eq!(doc.get_attribute(x, "k"), Some("1"));
        assert_eq!(doc.get_attribute(x, "missing"), None);
        let pairs: Vec<_> = doc.attributes(x).collect();
        assert_eq!(pairs, vec![("k", "1"), ("k", "2")]);
    }

    #[test]
    fn test_get_text_copy() {
        let doc = Document::parse(b"<cfg><name>master0</name><empty></empty></cfg>").unwrap();
        let cfg = doc.root_element();

        let mut dst = [0xffu8; 16];
        assert_eq!(doc.get_text_copy(cfg, "name", &mut dst), 7);
        assert_eq!(&dst[..8], b"master0\0");

        let mut small = [0xffu8; 4];
        assert_eq!(doc.get_text_copy(cfg, "name", &mut small), 3);
        assert_eq!(&small, b"mas\0");

        assert_eq!(doc.get_text_copy(cfg, "empty", &mut dst), 0);
        assert_eq!(dst[0], 0);
        assert_eq!(doc.get_text_copy(cfg, "absent", &mut dst), 0);
        assert_eq!(doc.get_text_copy(cfg, "name", &mut []), 0);
        assert_eq!(doc.child_text(cfg, "name"), Some("master0"));
    }

    #[test]
    fn test_in_place_mutates_caller_buffer() {
        let mut data = b"<a k='v'>t</a>".to_vec();
        {
            let doc = Document::parse_in_place(&mut data).unwrap();
            assert!(!doc.is_copied());
            assert_eq!(doc.get_attribute(doc.root_element(), "k"), Some("v"));
            free_document(doc);
        }
        assert_eq!(&data, b"<a\0k\0'v\0>t\0/a>");
    }

    #[test]
    fn test_into_buffer_returns_mutated_bytes() {
        let doc = Document::parse(b"<a>t</a>").unwrap();
        let buffer = doc.into_buffer();
        assert!(buffer.is_copied());
        assert_eq!(buffer.as_bytes(), b"<a\0t\0/a>");
    }

    #[test]
    fn test_parse_document_with_options() {
        let opts = ParseOptions::strict();
        let doc = parse_document(Buffer::copy_from(b"<a/>").unwrap(), &opts).unwrap();
        assert_eq!(doc.tag(doc.root_element()), Some("a"));

        let err = parse_document(Buffer::copy_from(b"<a><b></a>").unwrap(), &opts).unwrap_err();
        assert_eq!(err.severity(), Severity::Recoverable);
    }

    #[test]
    fn test_partial_tree_after_mismatch() {
        let doc = Document::parse(b"<a><b></a>").unwrap();
        let a = doc.root_element();
        assert!(doc.is_complete(a));
        let b = doc.first_child(a, Some("b")).unwrap();
        assert!(!doc.is_complete(b));
        assert_eq!(doc.diagnostics().len(), 1);
    }

    #[test]
    fn test_no_root_is_error() {
        assert_eq!(Document::parse(b"").unwrap_err(), ParseError::NoRootElement);
        assert_eq!(
            Document::parse(b"<?xml version=\"1.0\"?>").unwrap_err(),
            ParseError::NoRootElement
        );
    }

    #[test]
    fn test_find_by_path_edge_cases() {
        let doc = Document::parse(b"<a><b><c/></b></a>").unwrap();
        let root = doc.root();
        let c = doc.find_by_path(root, "a/b/c").unwrap();
        assert_eq!(doc.find_by_path(root, "/a//b/c/"), Some(c));
        assert_eq!(doc.find_by_path(root, ""), Some(root));
        let long = "x".repeat(100);
        assert_eq!(doc.find_by_path(root, &long), None);
        assert_eq!(doc.find_by_path(999, "a"), None);
    }

    #[test]
    fn test_children_iter() {
        let doc = Document::parse(b"<r><a/><!-- skip --><b/><c/></r>").unwrap();
        let tags: Vec<_> = doc
            .children(doc.root_element())
            .map(|id| doc.tag(id).unwrap())
            .collect();
        assert_eq!(tags, vec!["a", "b", "c"]);
        assert_eq!(doc.children(doc.root_element()).len(), 3);
    }
}
