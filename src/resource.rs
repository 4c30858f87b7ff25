//! ResourceArc Wrappers
//!
//! A parsed document kept alive on the BEAM side between NIF calls.

use crate::core::error::ParseError;
use crate::dom::{Buffer, Document, NodeId};
use crate::options::ParseOptions;
use crate::query::{CompiledPath, PathCache, PathError};
use rustler::ResourceArc;
use std::sync::Arc;

/// Compiled paths kept per document
const PATH_CACHE_CAPACITY: usize = 64;

/// Owns a copy-mode document; the tree is read-only so no lock is needed
pub struct DocumentResource {
    doc: Document<'static>,
    paths: PathCache,
}

impl DocumentResource {
    /// Copy `input` and parse it with `options`
    pub fn parse(input: &[u8], options: &ParseOptions) -> Result<Self, ParseError> {
        let doc = Document::parse_with_options(Buffer::copy_from(input)?, options)?;
        Ok(DocumentResource {
            doc,
            paths: PathCache::new(PATH_CACHE_CAPACITY),
        })
    }

    #[inline]
    pub fn doc(&self) -> &Document<'static> {
        &self.doc
    }

    /// Resolve `path` from the top-level element through the path cache
    pub fn find(&self, path: &str) -> Result<Option<NodeId>, PathError> {
        let compiled = self.compiled(path)?;
        Ok(compiled.resolve(&self.doc, self.doc.root_element()))
    }

    pub fn compiled(&self, path: &str) -> Result<Arc<CompiledPath>, PathError> {
        self.paths.get_or_compile(path)
    }

    pub fn paths(&self) -> &PathCache {
        &self.paths
    }
}

#[rustler::resource_impl]
impl rustler::Resource for DocumentResource {}

/// Type alias for document ResourceArc
pub type DocumentRef = ResourceArc<DocumentResource>;
