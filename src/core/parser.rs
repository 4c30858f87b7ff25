//! Recursive-descent element parser
//!
//! Consumes the buffer left to right. Every token (tag name, attribute name,
//! attribute value, text run) is recorded as a span, and the delimiter that
//! ended it is overwritten with NUL. Delimiters are remembered in locals
//! before they are overwritten, the buffer is never re-read at a spliced
//! position.
//!
//! Recovery: a closing tag that names an open ancestor closes that ancestor
//! and abandons everything in between; a closing tag naming nothing open
//! abandons the current element only. Errors the parser cannot resynchronize
//! from halt the parse and keep the tree built so far. Strict mode turns
//! every one of these into a failed parse.

use super::error::{Allocation, ParseError};
use super::prolog;
use super::scanner::{is_name_start_char, is_whitespace, Scanner};
use crate::dom::node::{Attribute, Element, NodeId, DOCUMENT_NODE};
use crate::dom::span::Span;
use crate::options::ParseOptions;

/// Arena and diagnostics produced by one parse
#[derive(Debug)]
pub struct ParsedTree {
    pub nodes: Vec<Element>,
    pub diagnostics: Vec<ParseError>,
}

/// How an element's parse ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Closing tag matched, or the tag was self-closed
    Closed,
    /// Subtree abandoned. `closes` is the depth of the open ancestor whose
    /// closing tag was consumed, if any.
    Abandoned { closes: Option<u16> },
    /// Parse stopped
    Halted,
}

/// How the start tag ended
enum TagEnd {
    Open,
    SelfClosed,
    Halted,
}

/// Builds the element arena from a mutable buffer
pub struct Parser<'b, 'o> {
    scanner: Scanner<'b>,
    options: &'o ParseOptions,
    nodes: Vec<Element>,
    diagnostics: Vec<ParseError>,
}

impl<'b, 'o> Parser<'b, 'o> {
    pub fn new(buf: &'b mut [u8], options: &'o ParseOptions) -> Self {
        Parser {
            scanner: Scanner::new(buf),
            options,
            nodes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Run the parse to completion
    pub fn parse(mut self) -> Result<ParsedTree, ParseError> {
        let len = self.scanner.len();
        if len > u32::MAX as usize {
            return Err(ParseError::InputTooLarge { len });
        }

        self.nodes
            .try_reserve(16)
            .map_err(|_| ParseError::OutOfMemory {
                what: Allocation::Document,
            })?;
        self.nodes.push(Element::document());

        prolog::skip_prolog(&mut self.scanner, self.options)?;

        let root = self.add_child(DOCUMENT_NODE).map_err(|err| match err {
            ParseError::OutOfMemory { .. } => ParseError::OutOfMemory {
                what: Allocation::Document,
            },
            other => other,
        })?;

        if self.parse_element(root)? == Outcome::Closed {
            self.check_trailing()?;
        } else {
            xml_log!(self.options, Error, "root element <{}> is incomplete", self.tag_lossy(root));
        }

        Ok(ParsedTree {
            nodes: self.nodes,
            diagnostics: self.diagnostics,
        })
    }

    /// Parse one element. The scanner sits just past its `<`.
    fn parse_element(&mut self, id: NodeId) -> Result<Outcome, ParseError> {
        let start = self.scanner.position();
        let Some(delim) = self.scanner.scan_tag_name() else {
            let tag = self.lossy(start, self.scanner.len());
            return self.halt(ParseError::UnexpectedEof { tag });
        };
        let end = self.scanner.position();
        if end == start {
            return self.halt(ParseError::MalformedTag {
                tag: String::new(),
                position: start,
                reason: "empty tag name",
            });
        }

        self.nodes[id as usize].tag = Span::from_range(start, end);
        self.scanner.terminate(end);
        xml_log!(self.options, Debug, "node: \"{}\"", self.tag_lossy(id));

        let tag_end = match delim {
            b'>' => {
                self.scanner.advance(1);
                TagEnd::Open
            }
            b'/' => self.finish_self_closed(id)?,
            _ => {
                self.scanner.advance(1);
                self.parse_attributes(id)?
            }
        };

        match tag_end {
            TagEnd::Open => {}
            TagEnd::SelfClosed => {
                self.nodes[id as usize].complete = true;
                xml_log!(self.options, Debug, "end closed node: \"{}\"", self.tag_lossy(id));
                return Ok(Outcome::Closed);
            }
            TagEnd::Halted => return Ok(Outcome::Halted),
        }

        // Text run: leading whitespace skipped, terminated at the next '<'
        self.scanner.skip_whitespace();
        let text_start = self.scanner.position();
        let Some(lt) = self.scanner.find_byte(b'<') else {
            let tag = self.tag_lossy(id);
            return self.halt(ParseError::UnexpectedEof { tag });
        };
        self.nodes[id as usize].text = Some(Span::from_range(text_start, lt));
        self.scanner.terminate(lt);
        self.scanner.set_position(lt + 1);
        xml_log!(self.options, Debug, "node text: \"{}\"", self.lossy(text_start, lt));

        let depth = self.nodes[id as usize].depth;
        loop {
            match self.scanner.peek() {
                None => {
                    let tag = self.tag_lossy(id);
                    return self.halt(ParseError::UnexpectedEof { tag });
                }
                Some(b'/') => return self.parse_close_tag(id),
                Some(b'!') => {
                    prolog::skip_comment(&mut self.scanner, self.options)?;
                    if !self.next_tag(id)? {
                        return Ok(Outcome::Halted);
                    }
                }
                Some(b'?') => {
                    if !prolog::skip_processing_instruction(&mut self.scanner) {
                        let tag = self.tag_lossy(id);
                        return self.halt(ParseError::UnexpectedEof { tag });
                    }
                    if !self.next_tag(id)? {
                        return Ok(Outcome::Halted);
                    }
                }
                Some(_) => {
                    let child = match self.add_child(id) {
                        Ok(child) => child,
                        Err(err) => return self.halt(err),
                    };
                    match self.parse_element(child)? {
                        Outcome::Closed | Outcome::Abandoned { closes: None } => {
                            if !self.next_tag(id)? {
                                return Ok(Outcome::Halted);
                            }
                        }
                        Outcome::Abandoned { closes: Some(d) } if d == depth => {
                            self.nodes[id as usize].complete = true;
                            return Ok(Outcome::Closed);
                        }
                        other => return Ok(other),
                    }
                }
            }
        }
    }

    /// Attribute loop, entered one past the whitespace that ended the tag name
    fn parse_attributes(&mut self, id: NodeId) -> Result<TagEnd, ParseError> {
        loop {
            self.scanner.skip_whitespace();
            match self.scanner.peek() {
                None => {
                    let tag = self.tag_lossy(id);
                    self.recover(ParseError::UnexpectedEof { tag })?;
                    return Ok(TagEnd::Halted);
                }
                Some(b'>') => {
                    self.scanner.advance(1);
                    return Ok(TagEnd::Open);
                }
                Some(b'/') => return self.finish_self_closed(id),
                Some(c) if is_name_start_char(c) => {
                    if !self.parse_attribute(id)? {
                        return Ok(TagEnd::Halted);
                    }
                }
                Some(_) => {
                    self.malformed(id, "unexpected character in tag")?;
                    return Ok(TagEnd::Halted);
                }
            }
        }
    }

    /// Parse `name="value"`. Returns false when the parse must halt.
    fn parse_attribute(&mut self, id: NodeId) -> Result<bool, ParseError> {
        let name_start = self.scanner.position();
        let Some(delim) = self.scanner.scan_attribute_name() else {
            let tag = self.tag_lossy(id);
            return self.stop(ParseError::UnexpectedEof { tag });
        };
        let name_end = self.scanner.position();

        match delim {
            b'=' => {
                self.scanner.terminate(name_end);
                self.scanner.advance(1);
            }
            c if is_whitespace(c) => {
                self.scanner.terminate(name_end);
                self.scanner.advance(1);
                self.scanner.skip_whitespace();
                if self.scanner.peek() != Some(b'=') {
                    return self.malformed(id, "attribute without value");
                }
                self.scanner.advance(1);
            }
            _ => return self.malformed(id, "attribute without value"),
        }

        self.scanner.skip_whitespace();
        let quote = match self.scanner.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => return self.malformed(id, "unquoted attribute value"),
            None => {
                let tag = self.tag_lossy(id);
                return self.stop(ParseError::UnexpectedEof { tag });
            }
        };
        self.scanner.advance(1);

        let value_start = self.scanner.position();
        let Some(value_end) = self.scanner.find_byte(quote) else {
            let tag = self.tag_lossy(id);
            return self.stop(ParseError::UnexpectedEof { tag });
        };
        self.scanner.terminate(value_end);
        self.scanner.set_position(value_end + 1);

        let attr = Attribute::new(
            Span::from_range(name_start, name_end),
            Span::from_range(value_start, value_end),
        );
        if let Err(err) = self.nodes[id as usize].push_attribute(attr) {
            return self.stop(err);
        }
        xml_log!(
            self.options,
            Debug,
            "attribute: {} = {}",
            self.lossy(name_start, name_end),
            self.lossy(value_start, value_end)
        );
        Ok(true)
    }

    /// Consume `/>`, the scanner sits on the '/'
    fn finish_self_closed(&mut self, id: NodeId) -> Result<TagEnd, ParseError> {
        if self.scanner.peek_at(1) == Some(b'>') {
            self.scanner.advance(2);
            Ok(TagEnd::SelfClosed)
        } else {
            self.malformed(id, "expected '>' after '/'")?;
            Ok(TagEnd::Halted)
        }
    }

    /// Handle `</name>`, the scanner sits on the '/'
    fn parse_close_tag(&mut self, id: NodeId) -> Result<Outcome, ParseError> {
        self.scanner.advance(1);
        let name_start = self.scanner.position();
        let Some(gt) = self.scanner.find_byte(b'>') else {
            let tag = self.tag_lossy(id);
            return self.halt(ParseError::UnexpectedEof { tag });
        };
        let mut name_end = gt;
        while name_end > name_start && is_whitespace(self.scanner.slice(name_end - 1, name_end)[0]) {
            name_end -= 1;
        }
        self.scanner.set_position(gt + 1);

        let tag = self.nodes[id as usize].tag;
        if self.scanner.slice(name_start, name_end) == self.scanner.slice(tag.offset as usize, tag.end()) {
            self.nodes[id as usize].complete = true;
            xml_log!(self.options, Debug, "node: \"{}\" end", self.tag_lossy(id));
            return Ok(Outcome::Closed);
        }

        let closes = self.open_ancestor(id, name_start, name_end);
        let err = ParseError::MismatchedCloseTag {
            expected: self.tag_lossy(id),
            found: self.lossy(name_start, name_end),
            position: name_start,
        };
        self.recover(err)?;
        Ok(Outcome::Abandoned { closes })
    }

    /// Depth of the nearest open ancestor named by `buf[start..end]`
    fn open_ancestor(&self, id: NodeId, start: usize, end: usize) -> Option<u16> {
        let name = self.scanner.slice(start, end);
        let mut current = self.nodes[id as usize].parent;
        while let Some(pid) = current {
            if pid == DOCUMENT_NODE {
                break;
            }
            let node = &self.nodes[pid as usize];
            if self.scanner.slice(node.tag.offset as usize, node.tag.end()) == name {
                return Some(node.depth);
            }
            current = node.parent;
        }
        None
    }

    /// Step to the byte after the next '<' between children.
    ///
    /// Returns false when the parse must halt.
    fn next_tag(&mut self, id: NodeId) -> Result<bool, ParseError> {
        self.scanner.skip_whitespace();
        match self.scanner.peek() {
            Some(b'<') => {
                self.scanner.advance(1);
                Ok(true)
            }
            None => {
                let tag = self.tag_lossy(id);
                self.stop(ParseError::UnexpectedEof { tag })
            }
            Some(_) => {
                let err = ParseError::UnexpectedContent {
                    tag: self.tag_lossy(id),
                    position: self.scanner.position(),
                };
                self.recover(err)?;
                match self.scanner.find_byte(b'<') {
                    Some(lt) => {
                        self.scanner.set_position(lt + 1);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }

    /// Allocate a child slot under `parent` and link it
    fn add_child(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        let depth = self.nodes[parent as usize].depth as usize + 1;
        let limit = self.options.max_depth.min(u16::MAX as usize);
        if depth > limit {
            return Err(ParseError::DepthLimitExceeded { limit });
        }
        if let Some(limit) = self.options.max_nodes {
            if self.nodes.len() > limit {
                return Err(ParseError::NodeLimitExceeded { limit });
            }
        }

        let id = self.nodes.len() as NodeId;
        let parent_node = &mut self.nodes[parent as usize];
        let index = parent_node.children.len();
        parent_node.ensure_capacity(index + 1)?;
        self.nodes
            .try_reserve(1)
            .map_err(|_| ParseError::OutOfMemory {
                what: Allocation::Element,
            })?;
        self.nodes
            .push(Element::child_of(parent, index as u32, depth as u16));
        self.nodes[parent as usize].children.push(id);
        Ok(id)
    }

    fn check_trailing(&mut self) -> Result<(), ParseError> {
        if let Some(position) = prolog::skip_misc(&mut self.scanner, self.options)? {
            let err = ParseError::TrailingContent { position };
            if self.options.strict {
                return Err(err);
            }
            xml_log!(self.options, Warn, "{}, ignored", err);
            self.diagnostics.push(err);
        }
        Ok(())
    }

    /// Log and record a recoverable error; strict mode fails instead
    fn recover(&mut self, err: ParseError) -> Result<(), ParseError> {
        if self.options.strict || err.is_fatal() {
            return Err(err);
        }
        xml_log!(self.options, Error, "{}", err);
        self.diagnostics.push(err);
        Ok(())
    }

    fn halt(&mut self, err: ParseError) -> Result<Outcome, ParseError> {
        self.recover(err)?;
        Ok(Outcome::Halted)
    }

    fn stop(&mut self, err: ParseError) -> Result<bool, ParseError> {
        self.recover(err)?;
        Ok(false)
    }

    fn malformed(&mut self, id: NodeId, reason: &'static str) -> Result<bool, ParseError> {
        let err = ParseError::MalformedTag {
            tag: self.tag_lossy(id),
            position: self.scanner.position(),
            reason,
        };
        self.stop(err)
    }

    fn lossy(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(self.scanner.slice(start, end)).into_owned()
    }

    fn tag_lossy(&self, id: NodeId) -> String {
        let tag = self.nodes[id as usize].tag;
        self.lossy(tag.offset as usize, tag.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &[u8]) -> (Vec<u8>, ParsedTree) {
        parse_with(input, &ParseOptions::default())
    }

    fn parse_with(input: &[u8], options: &ParseOptions) -> (Vec<u8>, ParsedTree) {
        let mut buf = input.to_vec();
        let tree = Parser::new(&mut buf, options).parse().unwrap();
        (buf, tree)
    }

    fn tag<'a>(buf: &'a [u8], tree: &ParsedTree, id: NodeId) -> &'a [u8] {
        tree.nodes[id as usize].tag.slice(buf)
    }

    #[test]
    fn test_simple_element() {
        let (buf, tree) = parse(b"<root attr=\"v\">hello</root>");
        assert_eq!(tree.nodes.len(), 2);
        let root = &tree.nodes[1];
        assert_eq!(root.tag.slice(&buf), b"root");
        assert_eq!(root.text.unwrap().slice(&buf), b"hello");
        assert_eq!(root.attributes[0].name.slice(&buf), b"attr");
        assert_eq!(root.attributes[0].value.slice(&buf), b"v");
        assert!(root.complete);
        assert!(tree.diagnostics.is_empty());
    }

    #[test]
    fn test_terminators_spliced() {
        let (buf, tree) = parse(b"<root a='1'>x</root>");
        let root = &tree.nodes[1];
        assert_eq!(buf[root.tag.end()], 0);
        assert_eq!(buf[root.attributes[0].name.end()], 0);
        assert_eq!(buf[root.attributes[0].value.end()], 0);
        assert_eq!(buf[root.text.unwrap().end()], 0);
    }

    #[test]
    fn test_self_closed_without_space() {
        let (buf, tree) = parse(b"<a><b><c/></b></a>");
        assert_eq!(tree.nodes.len(), 4);
        assert_eq!(tag(&buf, &tree, 3), b"c");
        assert!(tree.nodes[3].text.is_none());
        assert!(tree.nodes.iter().all(|n| n.complete));
    }

    #[test]
    fn test_self_closed_with_attribute() {
        let (buf, tree) = parse(b"<cfg><slave id=\"7\" name='io'/></cfg>");
        let slave = &tree.nodes[2];
        assert_eq!(slave.tag.slice(&buf), b"slave");
        assert_eq!(slave.attr_count(), 2);
        assert_eq!(slave.attributes[1].value.slice(&buf), b"io");
        assert!(slave.text.is_none());
    }

    #[test]
    fn test_whitespace_around_equals() {
        let (buf, tree) = parse(b"<a\tx = \"1\"\ny='2' ></a>");
        let a = &tree.nodes[1];
        assert_eq!(a.attributes[0].name.slice(&buf), b"x");
        assert_eq!(a.attributes[0].value.slice(&buf), b"1");
        assert_eq!(a.attributes[1].name.slice(&buf), b"y");
    }

    #[test]
    fn test_text_keeps_trailing_whitespace() {
        let (buf, tree) = parse(b"<a>  hi there </a>");
        assert_eq!(tree.nodes[1].text.unwrap().slice(&buf), b"hi there ");
    }

    #[test]
    fn test_comments_between_children() {
        let (buf, tree) = parse(b"<a><!-- one --><b/>\n<!-- two -->\n<c/></a>");
        let a = &tree.nodes[1];
        assert_eq!(a.child_count(), 2);
        assert_eq!(tag(&buf, &tree, a.children[0]), b"b");
        assert_eq!(tag(&buf, &tree, a.children[1]), b"c");
    }

    #[test]
    fn test_mismatched_close_abandons_child() {
        let (buf, tree) = parse(b"<a><b></a>");
        let a = &tree.nodes[1];
        let b = &tree.nodes[2];
        assert_eq!(b.tag.slice(&buf), b"b");
        assert!(!b.complete);
        assert!(a.complete);
        assert_eq!(tree.diagnostics.len(), 1);
        assert!(matches!(
            &tree.diagnostics[0],
            ParseError::MismatchedCloseTag { expected, found, .. } if expected == "b" && found == "a"
        ));
    }

    #[test]
    fn test_stray_close_resumes_in_parent() {
        let (buf, tree) = parse(b"<a><b></x><c/></a>");
        let a = &tree.nodes[1];
        assert!(a.complete);
        assert_eq!(a.child_count(), 2);
        assert!(!tree.nodes[2].complete);
        assert_eq!(tag(&buf, &tree, a.children[1]), b"c");
        assert!(tree.nodes[3].complete);
    }

    #[test]
    fn test_mismatch_is_error_in_strict_mode() {
        let mut buf = b"<a><b></a>".to_vec();
        let err = Parser::new(&mut buf, &ParseOptions::strict()).parse().unwrap_err();
        assert!(matches!(err, ParseError::MismatchedCloseTag { .. }));
    }

    #[test]
    fn test_truncated_input_halts() {
        let (buf, tree) = parse(b"<a><b x=\"1\">text");
        assert_eq!(tree.nodes.len(), 3);
        assert_eq!(tag(&buf, &tree, 2), b"b");
        assert!(!tree.nodes[1].complete);
        assert!(matches!(tree.diagnostics[0], ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_malformed_comment_is_fatal() {
        let mut buf = b"<a><!- bad --></a>".to_vec();
        let err = Parser::new(&mut buf, &ParseOptions::default()).parse().unwrap_err();
        assert!(matches!(err, ParseError::MalformedComment { .. }));
    }

    #[test]
    fn test_mixed_content_skipped() {
        let (buf, tree) = parse(b"<a><b/>tail<c/></a>");
        let a = &tree.nodes[1];
        assert!(a.complete);
        assert_eq!(a.child_count(), 2);
        assert_eq!(tag(&buf, &tree, a.children[1]), b"c");
        assert!(matches!(tree.diagnostics[0], ParseError::UnexpectedContent { .. }));
    }

    #[test]
    fn test_depth_limit() {
        let opts = ParseOptions::default().with_max_depth(2);
        let (_, tree) = parse_with(b"<a><b><c/></b></a>", &opts);
        assert_eq!(tree.nodes.len(), 3);
        assert_eq!(tree.diagnostics, vec![ParseError::DepthLimitExceeded { limit: 2 }]);
    }

    #[test]
    fn test_node_limit() {
        let opts = ParseOptions::default().with_max_nodes(2);
        let (_, tree) = parse_with(b"<a><b/><c/><d/></a>", &opts);
        // document node + a + b
        assert_eq!(tree.nodes.len(), 3);
        assert_eq!(tree.diagnostics, vec![ParseError::NodeLimitExceeded { limit: 2 }]);
    }

    #[test]
    fn test_trailing_content() {
        let (_, tree) = parse(b"<a/><!-- c -->\n");
        assert!(tree.diagnostics.is_empty());

        let (_, tree) = parse(b"<a/>junk");
        assert_eq!(tree.diagnostics, vec![ParseError::TrailingContent { position: 4 }]);

        let mut buf = b"<a/>junk".to_vec();
        assert!(Parser::new(&mut buf, &ParseOptions::strict()).parse().is_err());
    }

    #[test]
    fn test_unquoted_attribute_halts() {
        let (_, tree) = parse(b"<a x=1></a>");
        assert!(matches!(
            tree.diagnostics[0],
            ParseError::MalformedTag { reason: "unquoted attribute value", .. }
        ));
        assert!(!tree.nodes[1].complete);
    }

    #[test]
    fn test_processing_instruction_inside_element() {
        let (buf, tree) = parse(b"<a><?keep me?><b/></a>");
        assert_eq!(tree.nodes[1].child_count(), 1);
        assert_eq!(tag(&buf, &tree, 2), b"b");
    }
}
