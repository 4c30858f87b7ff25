//! Element representation
//!
//! Uses NodeId (u32) for compact references into the document arena.

use super::span::Span;
use crate::core::error::{Allocation, ParseError};

/// Compact element identifier (index into arena)
pub type NodeId = u32;

/// The synthetic document node is always the first arena entry
pub const DOCUMENT_NODE: NodeId = 0;

/// One name/value pair, both pointing back into the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub name: Span,
    pub value: Span,
}

impl Attribute {
    pub fn new(name: Span, value: Span) -> Self {
        Attribute { name, value }
    }
}

/// One parsed tag instance in the arena
#[derive(Debug, Clone)]
pub struct Element {
    /// Tag name (empty for the document node)
    pub tag: Span,
    /// Direct text content; `None` for self-closed tags and the document node
    pub text: Option<Span>,
    /// Attributes in document order, names need not be unique
    pub attributes: Vec<Attribute>,
    /// Children in document order
    pub children: Vec<NodeId>,
    /// Parent element (None for the document node)
    pub parent: Option<NodeId>,
    /// Position within the parent's children
    pub index: u32,
    /// Nesting depth, the document node is 0
    pub depth: u16,
    /// False when a recoverable error abandoned this subtree
    pub complete: bool,
}

impl Element {
    /// Create the synthetic document node
    pub fn document() -> Self {
        Element {
            tag: Span::empty(),
            text: None,
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
            index: 0,
            depth: 0,
            complete: true,
        }
    }

    /// Create a fresh element whose tag is not scanned yet
    pub fn child_of(parent: NodeId, index: u32, depth: u16) -> Self {
        Element {
            tag: Span::empty(),
            text: None,
            attributes: Vec::new(),
            children: Vec::new(),
            parent: Some(parent),
            index,
            depth,
            complete: false,
        }
    }

    /// Make room for `desired` live children.
    ///
    /// Grows only when the current capacity is insufficient, and then by
    /// exactly the missing amount (the parser asks for one slot per child).
    pub fn ensure_capacity(&mut self, desired: usize) -> Result<(), ParseError> {
        if desired <= self.children.capacity() {
            return Ok(());
        }
        self.children
            .try_reserve_exact(desired - self.children.len())
            .map_err(|_| ParseError::OutOfMemory {
                what: Allocation::Children,
            })
    }

    /// Append an attribute, growing the array by exactly one slot
    pub fn push_attribute(&mut self, attr: Attribute) -> Result<(), ParseError> {
        self.attributes
            .try_reserve_exact(1)
            .map_err(|_| ParseError::OutOfMemory {
                what: Allocation::Attributes,
            })?;
        self.attributes.push(attr);
        Ok(())
    }

    #[inline]
    pub fn attr_count(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Self-closed tags never get a text span
    #[inline]
    pub fn is_self_closed(&self) -> bool {
        self.parent.is_some() && self.text.is_none() && self.children.is_empty()
    }
}
