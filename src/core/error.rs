//! Parse error model
//!
//! Every error carries a severity. Fatal errors always fail the parse;
//! recoverable ones are logged and recorded on the document in lenient mode
//! and fail the parse in strict mode.

use std::fmt;
use thiserror::Error;

/// What the parser was allocating when memory ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    /// Owned copy of the input (copy mode)
    Buffer,
    /// Arena and synthetic document node
    Document,
    /// Arena slot for a new element
    Element,
    /// One more attribute slot
    Attributes,
    /// One more child slot
    Children,
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Allocation::Buffer => "document buffer",
            Allocation::Document => "document node",
            Allocation::Element => "element arena",
            Allocation::Attributes => "attribute array",
            Allocation::Children => "child array",
        };
        f.write_str(what)
    }
}

/// How the parser reacts to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The parse cannot produce a document
    Fatal,
    /// The affected subtree is abandoned, the rest of the tree survives
    Recoverable,
}

/// Errors raised while building a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed comment at byte {position}")]
    MalformedComment { position: usize },

    #[error("no root element found")]
    NoRootElement,

    #[error("input of {len} bytes exceeds the 4 GiB addressable limit")]
    InputTooLarge { len: usize },

    #[error("out of memory while allocating {what}")]
    OutOfMemory { what: Allocation },

    #[error("unbalanced closing tag </{found}> for <{expected}> at byte {position}")]
    MismatchedCloseTag {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("unexpected end of input inside <{tag}>")]
    UnexpectedEof { tag: String },

    #[error("malformed tag <{tag}> at byte {position}: {reason}")]
    MalformedTag {
        tag: String,
        position: usize,
        reason: &'static str,
    },

    #[error("unexpected content inside <{tag}> at byte {position}")]
    UnexpectedContent { tag: String, position: usize },

    #[error("content after the root element at byte {position}")]
    TrailingContent { position: usize },

    #[error("nesting depth limit of {limit} exceeded")]
    DepthLimitExceeded { limit: usize },

    #[error("element limit of {limit} exceeded")]
    NodeLimitExceeded { limit: usize },
}

impl ParseError {
    pub fn severity(&self) -> Severity {
        match self {
            ParseError::MalformedComment { .. }
            | ParseError::NoRootElement
            | ParseError::InputTooLarge { .. } => Severity::Fatal,
            // Setup allocations happen before any tree exists.
            ParseError::OutOfMemory {
                what: Allocation::Buffer | Allocation::Document,
            } => Severity::Fatal,
            _ => Severity::Recoverable,
        }
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    /// Malformed input as opposed to resource exhaustion
    pub fn is_malformed_input(&self) -> bool {
        !matches!(
            self,
            ParseError::OutOfMemory { .. }
                | ParseError::InputTooLarge { .. }
                | ParseError::DepthLimitExceeded { .. }
                | ParseError::NodeLimitExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_split() {
        assert!(ParseError::MalformedComment { position: 3 }.is_fatal());
        assert!(ParseError::NoRootElement.is_fatal());
        assert!(ParseError::OutOfMemory { what: Allocation::Buffer }.is_fatal());
        assert!(!ParseError::OutOfMemory { what: Allocation::Children }.is_fatal());
        let mismatch = ParseError::MismatchedCloseTag {
            expected: "b".into(),
            found: "a".into(),
            position: 7,
        };
        assert_eq!(mismatch.severity(), Severity::Recoverable);
    }

    #[test]
    fn test_malformed_vs_resource() {
        assert!(ParseError::MalformedComment { position: 0 }.is_malformed_input());
        assert!(!ParseError::OutOfMemory { what: Allocation::Attributes }.is_malformed_input());
        assert!(!ParseError::DepthLimitExceeded { limit: 4 }.is_malformed_input());
    }

    #[test]
    fn test_display() {
        let err = ParseError::MismatchedCloseTag {
            expected: "b".into(),
            found: "a".into(),
            position: 7,
        };
        assert_eq!(err.to_string(), "unbalanced closing tag </a> for <b> at byte 7");
    }
}
