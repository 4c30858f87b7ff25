//! DOM Module - Arena-based element tree over an in-place buffer
//!
//! Implements the document representation using:
//! - Arena allocation for elements
//! - NodeId (u32) indices for cache-friendly traversal
//! - Spans into the mutated input instead of owned strings

pub mod buffer;
pub mod document;
pub mod node;
pub mod span;

pub use buffer::Buffer;
pub use document::{free_document, parse_document, AttributeIter, ChildIter, Document};
pub use node::{Attribute, Element, NodeId, DOCUMENT_NODE};
pub use span::Span;
