//! Slash-separated element paths
//!
//! A path such as `slaves/slave/name` names one child per segment. Empty
//! segments are ignored, so leading, trailing and doubled slashes are
//! harmless. Each segment is bounded by `MAX_SEGMENT_LEN`.

use crate::dom::document::Document;
use crate::dom::node::NodeId;
use thiserror::Error;

/// Longest tag name a path segment may hold
pub const MAX_SEGMENT_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path segment \"{segment}\" is {len} bytes, limit is {MAX_SEGMENT_LEN}")]
    SegmentTooLong { segment: String, len: usize },
}

/// Split `path` into bounded, non-empty segments
pub fn path_segments(path: &str) -> impl Iterator<Item = Result<&str, PathError>> {
    path.split('/').filter(|s| !s.is_empty()).map(|segment| {
        if segment.len() > MAX_SEGMENT_LEN {
            Err(PathError::SegmentTooLong {
                segment: segment.to_string(),
                len: segment.len(),
            })
        } else {
            Ok(segment)
        }
    })
}

/// A path validated once and reusable across lookups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    segments: Vec<Box<str>>,
}

impl CompiledPath {
    pub fn compile(path: &str) -> Result<Self, PathError> {
        let segments = path_segments(path)
            .map(|s| s.map(Box::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CompiledPath { segments })
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| &**s)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// An empty path resolves to the starting element
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First match per segment, like `Document::find_by_path`
    pub fn resolve(&self, doc: &Document<'_>, from: NodeId) -> Option<NodeId> {
        doc.element(from)?;
        self.segments
            .iter()
            .try_fold(from, |current, segment| doc.first_child(current, Some(&**segment)))
    }

    /// Every element reachable along the path, in document order
    pub fn resolve_all(&self, doc: &Document<'_>, from: NodeId) -> Vec<NodeId> {
        if doc.element(from).is_none() {
            return Vec::new();
        }
        let mut frontier = vec![from];
        for segment in &self.segments {
            frontier = frontier
                .into_iter()
                .flat_map(|id| doc.children(id))
                .filter(|&child| doc.tag_bytes(child) == segment.as_bytes())
                .collect();
            if frontier.is_empty() {
                break;
            }
        }
        frontier
    }
}
